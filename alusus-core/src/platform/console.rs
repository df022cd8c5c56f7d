//! Console encoding and argv normalization.
//!
//! Both facilities are scoped acquisitions intended to be taken at the top
//! of `main` and held for the entire process: the Windows console code
//! pages are switched to UTF-8 and restored on drop, and the native argv
//! is re-presented as owned UTF-8 strings whose lifetime covers the whole
//! run. On POSIX both are pass-throughs.

/// Scoped UTF-8 console acquisition.
///
/// On Windows, construction switches the console input and output code
/// pages to UTF-8 and `Drop` restores the originals; everywhere else this
/// is a no-op. The guard must outlive every I/O operation that assumes a
/// UTF-8 console, including panic output, so tie it to the outermost
/// scope of `main`.
pub struct Utf8ConsoleGuard {
    #[cfg(windows)]
    original_input: u32,
    #[cfg(windows)]
    original_output: u32,
}

impl Utf8ConsoleGuard {
    #[cfg(windows)]
    pub fn acquire() -> Self {
        // SAFETY: plain code-page queries and switches on the process
        // console.
        unsafe {
            let guard = Utf8ConsoleGuard {
                original_input: win::GetConsoleCP(),
                original_output: win::GetConsoleOutputCP(),
            };
            win::SetConsoleCP(win::CP_UTF8);
            win::SetConsoleOutputCP(win::CP_UTF8);
            guard
        }
    }

    #[cfg(not(windows))]
    pub fn acquire() -> Self {
        Utf8ConsoleGuard {}
    }
}

impl Drop for Utf8ConsoleGuard {
    fn drop(&mut self) {
        #[cfg(windows)]
        unsafe {
            win::SetConsoleCP(self.original_input);
            win::SetConsoleOutputCP(self.original_output);
        }
    }
}

/// The process argument vector as owned UTF-8 strings.
///
/// On Windows the native UTF-16 arguments are re-encoded; on POSIX the
/// byte arguments pass through (invalid sequences are replaced). The
/// returned vector owns its storage, so references into it stay valid for
/// as long as the caller keeps it.
pub fn normalized_args() -> Vec<String> {
    std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(windows)]
mod win {
    pub const CP_UTF8: u32 = 65001;

    #[link(name = "kernel32")]
    extern "system" {
        pub fn GetConsoleCP() -> u32;
        pub fn GetConsoleOutputCP() -> u32;
        pub fn SetConsoleCP(code_page: u32) -> i32;
        pub fn SetConsoleOutputCP(code_page: u32) -> i32;
    }
}
