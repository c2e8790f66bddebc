//! Popup templates supplied compiled or by name.
//!
//! Template syntax is never parsed here. A named template is handed to a
//! caller-supplied [`TemplateCompiler`] once, when the sheet is built.

use std::fmt;
use std::sync::Arc;

use sheetmap_core::PopupFn;
use thiserror::Error;

/// Errors returned by a [`TemplateCompiler`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The compiler knows no template by this name.
    #[error("no popup template named {name:?}")]
    NotFound {
        /// Template identifier.
        name: String,
    },
    /// The template exists but could not be compiled.
    #[error("popup template {name:?} is invalid: {reason}")]
    Invalid {
        /// Template identifier.
        name: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

/// Turns a template identifier into a row renderer.
///
/// # Examples
/// ```
/// use sheetmap_core::{PopupFn, popup_fn};
/// use sheetmap_sheet::{TemplateCompiler, TemplateError};
///
/// struct Fixed;
///
/// impl TemplateCompiler for Fixed {
///     fn compile(&self, name: &str) -> Result<PopupFn, TemplateError> {
///         match name {
///             "names" => Ok(popup_fn(|row| {
///                 row.get("name").map(ToString::to_string).unwrap_or_default()
///             })),
///             _ => Err(TemplateError::NotFound { name: name.to_owned() }),
///         }
///     }
/// }
///
/// assert!(Fixed.compile("names").is_ok());
/// assert!(Fixed.compile("other").is_err());
/// ```
pub trait TemplateCompiler {
    /// Compile the template identified by `name`.
    ///
    /// # Errors
    /// Returns [`TemplateError`] when the template is unknown or invalid.
    fn compile(&self, name: &str) -> Result<PopupFn, TemplateError>;
}

/// Shared handle to a [`TemplateCompiler`].
pub type SharedCompiler = Arc<dyn TemplateCompiler + Send + Sync>;

/// A popup template as configured.
#[derive(Clone)]
pub enum PopupTemplate {
    /// Already compiled renderer.
    Compiled(PopupFn),
    /// Identifier resolved through the configured compiler.
    Named(String),
}

impl PopupTemplate {
    /// Resolve to a renderer, compiling named templates with `compiler`.
    pub(crate) fn resolve(
        self,
        compiler: Option<&SharedCompiler>,
    ) -> Result<PopupFn, crate::SheetError> {
        match self {
            Self::Compiled(render) => Ok(render),
            Self::Named(name) => {
                let Some(found) = compiler else {
                    return Err(crate::SheetError::TemplateCompilerMissing { name });
                };
                Ok(found.compile(&name)?)
            }
        }
    }
}

impl fmt::Debug for PopupTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compiled(_) => f.write_str("Compiled(<fn>)"),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}
