//! The `{code, diagnostics}` result shape returned by code-producing
//! operations, modelled as an explicit sum type.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::diagnostic::Diagnostic;

/// Outcome of a code-producing backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Wrapped<T> {
    /// The operation produced code; diagnostics are warnings at most.
    Success {
        /// Produced value.
        code: T,
        /// Diagnostics reported alongside the value.
        diagnostics: Vec<Diagnostic>,
    },
    /// The operation produced no code.
    Failure {
        /// Diagnostics explaining the failure, when the backend supplied any.
        diagnostics: Option<Vec<Diagnostic>>,
    },
}

impl<T> Wrapped<T> {
    /// Success without diagnostics.
    #[must_use]
    pub const fn success(code: T) -> Self {
        Self::Success {
            code,
            diagnostics: Vec::new(),
        }
    }

    /// Failure carrying diagnostics.
    #[must_use]
    pub const fn failure(diagnostics: Vec<Diagnostic>) -> Self {
        Self::Failure {
            diagnostics: Some(diagnostics),
        }
    }

    /// Builds the variant from the loose `{code, diagnostics}` parts.
    #[must_use]
    pub fn from_parts(code: Option<T>, diagnostics: Option<Vec<Diagnostic>>) -> Self {
        match code {
            Some(value) => Self::Success {
                code: value,
                diagnostics: diagnostics.unwrap_or_default(),
            },
            None => Self::Failure { diagnostics },
        }
    }

    /// Whether code was produced.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Diagnostics attached to either variant.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Success { diagnostics, .. } => diagnostics,
            Self::Failure { diagnostics } => diagnostics.as_deref().unwrap_or_default(),
        }
    }

    /// Keeps the code on success and hands the diagnostics back on failure.
    pub(crate) fn into_code(self) -> Result<T, Option<Vec<Diagnostic>>> {
        match self {
            Self::Success { code, .. } => Ok(code),
            Self::Failure { diagnostics } => Err(diagnostics),
        }
    }
}

/// Wire form of a wrapped result, as produced by backends that answer in JSON.
///
/// `code` follows JavaScript truthiness: `null`, `false`, `0`, and `""` mean
/// the operation failed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawWrapped {
    #[serde(default)]
    code: serde_json::Value,
    #[serde(default)]
    diagnostics: Option<Vec<Diagnostic>>,
}

impl RawWrapped {
    /// Decodes the wire form into a typed [`Wrapped`].
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when a truthy `code` does not match `T`.
    pub fn into_wrapped<T: DeserializeOwned>(self) -> Result<Wrapped<T>, serde_json::Error> {
        if !is_truthy(&self.code) {
            return Ok(Wrapped::Failure {
                diagnostics: self.diagnostics,
            });
        }
        let code = serde_json::from_value(self.code)?;
        Ok(Wrapped::Success {
            code,
            diagnostics: self.diagnostics.unwrap_or_default(),
        })
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(number) => number
            .as_f64()
            .is_some_and(|float| float != 0.0 && !float.is_nan()),
        serde_json::Value::String(text) => !text.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
