use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

/// Textual snapshot of an error attached to a log call.
///
/// Rendered into the `exception` field as
/// `<type>: <message>`, one ` ---> <cause>` line per source, then the
/// backtrace when one was captured (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    type_name: Option<String>,
    message: String,
    causes: Vec<String>,
    backtrace: Option<String>,
}

impl Exception {
    /// Capture a concrete error, including its type name.
    pub fn new<E: Error + 'static>(error: &E) -> Self {
        let mut exception = Self::from_dyn(error);
        exception.type_name = Some(std::any::type_name::<E>().to_string());
        exception
    }

    /// Capture a type-erased error. The type name is unknown here.
    pub fn from_dyn(error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        let backtrace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        Exception {
            type_name: None,
            message: error.to_string(),
            causes,
            backtrace,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(f, "{}: {}", type_name, self.message)?,
            None => f.write_str(&self.message)?,
        }
        for cause in &self.causes {
            write!(f, "\n ---> {}", cause)?;
        }
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\n{}", backtrace)?;
        }
        Ok(())
    }
}
