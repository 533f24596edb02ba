use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// RUST_LOG if set, otherwise info
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route tracing to the browser console
        pub fn init() {
            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();

            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init();
        }
    } else {
        use std::ffi::OsStr;
        use std::io;
        use std::path::{Path, PathBuf};

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        const DEFAULT_LOG_FILE: &str = "logs/voxel-demo.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// RUST_LOG_FILE split into the directory and file prefix for the daily roller
        fn log_file_location(setting: Option<String>) -> (PathBuf, PathBuf) {
            let path = PathBuf::from(setting.unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()));
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            let file = PathBuf::from(path.file_name().unwrap_or(OsStr::new("voxel-demo.log")));
            (dir, file)
        }

        /// Compact stderr output plus a daily log file. Safe to call twice.
        pub fn init() {
            let (dir, file) = log_file_location(std::env::var("RUST_LOG_FILE").ok());
            let (file_writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
            let _ = FILE_GUARD.set(guard);

            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .compact();

            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_ok();

            if installed {
                std::panic::set_hook(Box::new(log_panic));
            }
        }

        fn log_panic(info: &std::panic::PanicHookInfo<'_>) {
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                .unwrap_or_else(|| "<unknown>".to_string());
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic>".to_string());
            let backtrace = std::backtrace::Backtrace::force_capture();
            tracing::error!("panic at {location}: {message}\nBacktrace:\n{backtrace}");
        }

        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn test_default_log_location() {
                let (dir, file) = log_file_location(None);
                assert_eq!(dir, PathBuf::from("logs"));
                assert_eq!(file, PathBuf::from("voxel-demo.log"));
            }

            #[test]
            fn test_bare_file_name_logs_to_cwd() {
                let (dir, file) = log_file_location(Some("demo.log".to_string()));
                assert_eq!(dir, PathBuf::from("."));
                assert_eq!(file, PathBuf::from("demo.log"));
            }
        }
    }
}
