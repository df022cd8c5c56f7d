//! Alusus CLI
//!
//! The entry point of the `alusus` binary: UTF-8 console and argv
//! acquisition, system-language detection, localization setup, flag
//! parsing (English and Arabic spellings), and the help / interactive /
//! batch dispatch.

use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use colored::Colorize;

use alusus_core::ast;
use alusus_core::driver::DriverFactory;
use alusus_core::engine::Engine;
use alusus_core::notices::print_notice;
use alusus_core::platform::{console, env};
use alusus_core::root::{FileError, RootError, RootManager};

/// The Alusus programming language.
#[derive(Parser)]
#[command(
    name = "alusus",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print usage information.
    #[arg(long = "help", alias = "مساعدة")]
    help: bool,

    /// Read the program from standard input as a stream.
    #[arg(
        long = "interactive",
        short = 'i',
        alias = "تفاعلي",
        short_alias = 'ت'
    )]
    interactive: bool,

    /// Dump the resulting AST after processing.
    #[arg(long = "dump", alias = "إلقاء")]
    dump: bool,

    /// 6-bit log-detail mask (debug builds only).
    #[cfg(debug_assertions)]
    #[arg(long = "log", alias = "تدوين", value_name = "MASK")]
    log: Option<u8>,

    /// Source file to process.
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Arguments passed through to the processed program.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    program_args: Vec<String>,
}

impl Cli {
    fn log_mask(&self) -> Option<u8> {
        #[cfg(debug_assertions)]
        {
            self.log
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}

fn main() -> ExitCode {
    // Both scopes live until process exit, covering every I/O operation
    // and the whole lifetime of references into argv.
    let _console = console::Utf8ConsoleGuard::acquire();
    let args = console::normalized_args();

    let language = env::system_language();

    let cli = match Cli::try_parse_from(args.iter()) {
        Ok(cli) => cli,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(cli.log_mask());

    // No source and no interactive request means the user wants help.
    if cli.help || (cli.source.is_none() && !cli.interactive) {
        print_help(language);
        return ExitCode::SUCCESS;
    }

    let factory: DriverFactory = Rc::new(|| Box::new(Engine::new()));
    let mut root = match RootManager::new(&args, factory) {
        Ok(root) => root,
        Err(error) => {
            report_verbose(&error);
            return ExitCode::FAILURE;
        }
    };
    root.set_language(language);

    // <install>/Notices_L18n/<lang>.txt, next to the binary directory.
    if let Some(install) = root.core_bin_path().parent() {
        root.l18n()
            .borrow_mut()
            .initialize(language, &install.join("Notices_L18n"));
    }

    let dictionary = root.l18n().clone();
    root.notices_mut().connect(Box::new(move |notice| {
        print_notice(notice, &dictionary.borrow());
    }));

    if cli.interactive {
        run_interactive(&mut root, language)
    } else {
        // The help guard above leaves `source` present on this branch.
        let source = cli.source.as_deref().unwrap_or_default();
        run_batch(&mut root, source, cli.dump, language)
    }
}

fn run_interactive(root: &mut RootManager, language: &str) -> ExitCode {
    if language == "ar" {
        println!("تنفيذ بشكل تفاعلي.");
        println!("إضغط على CTRL+C للخروج.");
    } else {
        println!("Running in interactive mode.");
        println!("Press CTRL+C to exit.");
    }
    println!();

    root.set_interactive(true);
    let stdin = io::stdin();
    match root.process_stream(&mut stdin.lock(), "user input") {
        Ok(_) => exit_code_for(root),
        Err(error) => {
            report_verbose(&error);
            ExitCode::FAILURE
        }
    }
}

fn run_batch(root: &mut RootManager, source: &str, dump: bool, language: &str) -> ExitCode {
    match root.process_file(source, false) {
        Ok(result) => {
            if dump {
                if let Some(tree) = &result {
                    println!();
                    println!("-- BUILD COMPLETE --");
                    println!();
                    println!("Build Results:");
                    println!();
                    print!("{}", ast::dump(tree));
                }
            }
            exit_code_for(root)
        }
        Err(RootError::File(error)) => {
            report_file_error(&error, language);
            ExitCode::FAILURE
        }
        Err(error) => {
            report_verbose(&error);
            ExitCode::FAILURE
        }
    }
}

/// A run that collected a fatal or error notice fails even when no error
/// propagated out of processing.
fn exit_code_for(root: &RootManager) -> ExitCode {
    match root.min_notice_severity() {
        Some(severity) if severity.is_failure() => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn report_file_error(error: &FileError, language: &str) {
    match error {
        FileError::NotFound(name) => {
            if language == "ar" {
                println!("الملف مفقود: {name}");
            } else {
                println!("File not found: {name}");
            }
        }
        FileError::InvalidType(name) => {
            if language == "ar" {
                println!("صنف الملف غير صالح: {name}");
            } else {
                println!("Invalid file type: {name}");
            }
        }
    }
}

fn report_verbose(error: &dyn std::error::Error) {
    eprintln!("{}: {error}", "error".red().bold());
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

fn init_tracing(log_mask: Option<u8>) {
    use tracing_subscriber::EnvFilter;

    let filter = match log_mask {
        // The 6-bit mask maps onto detail tiers: the high bits select
        // trace-level output, anything nonzero at least debug.
        Some(0) => EnvFilter::new("off"),
        Some(mask) if mask >= 0b100000 => EnvFilter::new("trace"),
        Some(_) => EnvFilter::new("debug"),
        None => EnvFilter::from_default_env(),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_help(language: &str) {
    let version = env!("CARGO_PKG_VERSION");
    if language == "ar" {
        println!("لغة الأسُس");
        println!("الإصدار {version}");
        println!();
        println!("طريقة الاستخدام:");
        println!("الأسُس [<خيارات القلب>] <الشفرة المصدرية> [<خيارات البرنامج>]");
        println!("الشفرة المصدرية = اسم الملف الحاوي على الشفرة المصدرية");
        println!("alusus [<Core options>] <source> [<program options>]");
        println!();
        println!("الخيارات:");
        println!("\tتنفيذ بشكل تفاعلي:");
        println!("\t\t--تفاعلي");
        println!("\t\t-ت");
        println!("\t\t--interactive");
        println!("\t\t-i");
        println!("\tالقاء شجرة AST عند الانتهاء:");
        println!("\t\t--إلقاء");
        println!("\t\t--dump");
        if cfg!(debug_assertions) {
            println!("\tالتحكم بمستوى التدوين (قيمة من 6 بتات):");
            println!("\t\t--تدوين");
            println!("\t\t--log");
        }
    } else {
        println!("Alusus Language");
        println!("Version {version}");
        println!();
        println!("Usage: alusus [<Core options>] <source> [<program options>]");
        println!("source = filename.");
        println!();
        println!("Options:");
        println!("\t--interactive, -i  Run in interactive mode.");
        println!("\t--dump  Tells the Core to dump the resulting AST tree.");
        if cfg!(debug_assertions) {
            println!("\t--log  A 6 bit value to control the level of details of the log.");
        }
    }
}
