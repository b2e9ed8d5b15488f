/// Machine Translation Module
///
/// Provider abstraction for the tree walker and the language session.
///
/// # Overview
///
/// 1. **MT Trait** - `MachineTranslator`, one async `translate` per string
/// 2. **LibreTranslate Provider** - HTTP adapter for `{q, source, target, format}` endpoints
/// 3. **Mock Provider** - Deterministic translator that records its requests
/// 4. **Errors** - `MtError`, shared by providers, the cache and configuration
///
/// # Example
///
/// ```ignore
/// use leafy_i18n::mt::{LibreTranslateProvider, MachineTranslator};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = LibreTranslateProvider::from_env()?;
///     let translated = provider.translate("Hello", "en", "fr").await?;
///     println!("{}", translated);
///     Ok(())
/// }
/// ```
pub mod error;
pub mod libre_translate;
pub mod mock;
pub mod translator;

pub use error::{MtError, MtResult};
pub use libre_translate::LibreTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use translator::{MachineTranslator, normalize_locale, same_language, validate_locale};
