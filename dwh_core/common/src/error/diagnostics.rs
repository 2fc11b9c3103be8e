use std::{borrow::Cow, fmt, panic::Location};

/// Error message paired with the source location that raised it.
///
/// Built through [`DiagnosticMessage::new`], which is `#[track_caller]`, so
/// the recorded location is the constructor helper's caller rather than the
/// helper itself.
#[derive(Clone, Debug)]
pub struct DiagnosticMessage {
    message: Cow<'static, str>,
    location: &'static Location<'static>,
}

impl DiagnosticMessage {
    #[track_caller]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at {}:{})",
            self.message,
            self.location.file(),
            self.location.line()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_the_caller_location() {
        let diag = DiagnosticMessage::new("cluster missing");
        assert_eq!(diag.message(), "cluster missing");
        assert_eq!(diag.location().file(), file!());
        assert!(diag.to_string().starts_with("cluster missing (at "));
    }
}
