use sentry::ClientOptions;
use serde_json::Value;

pub struct Sentry;

impl Sentry {
    /// Initializes Sentry when a DSN is configured.
    /// The returned guard has to live as long as the process.
    pub fn setup(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
        if cfg!(test) {
            return None;
        }
        let dsn = dsn?;

        let guard = sentry::init((
            dsn,
            ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ));

        Self::add_tag("type", "forwarder");
        Some(guard)
    }

    /// Adds a tag (key-value pair) to the Sentry event for short, string-based metadata.
    pub fn add_tag(key: &str, value: &str) {
        if cfg!(test) {
            return;
        }
        sentry::configure_scope(|scope| {
            scope.set_tag(key, value);
        });
    }

    /// Adds extra data (arbitrary JSON) to the Sentry event.
    pub fn add_extra(key: &str, value: Value) {
        if cfg!(test) {
            return;
        }
        sentry::configure_scope(|scope| {
            scope.set_extra(key, value);
        });
    }

    pub fn capture_message(message: &str, level: sentry::Level) {
        if cfg!(test) {
            return;
        }
        sentry::capture_message(message, level);
    }
}
