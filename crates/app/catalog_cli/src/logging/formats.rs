use flexi_logger::DeferredNow;
use log::{Level, Record};

/// `level: message`, with the module path added at debug and below.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    match record.level() {
        Level::Error | Level::Warn | Level::Info => {
            write!(w, "{}: {}", label(record.level()), record.args())
        }
        Level::Debug | Level::Trace => write!(
            w,
            "{} [{}] {}",
            label(record.level()),
            record.module_path().unwrap_or("<unknown>"),
            record.args()
        ),
    }
}

fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}
