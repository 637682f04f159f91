//! Internationalization support for the Woxl moderation bot
//!
//! Every user-facing reply is a Fluent message. The Russian and English
//! resources are compiled into the binary and checked for key and
//! parameter parity by the build script.
//!
//! # Example
//!
//! ```rust
//! use woxl_i18n::{fluent_args, I18nManager, Locale};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = I18nManager::new(Locale::Russian)?;
//! let args = fluent_args!["user" => "Bob"];
//! let text = manager.get_message("role-none", &Locale::English, args.as_ref())?;
//! assert_eq!(text, "Bob has no role.");
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod error;
pub mod locale;
pub mod manager;
pub mod resource;

pub use bundle::BundleManager;
pub use error::{I18nError, I18nResult};
pub use locale::Locale;
pub use manager::I18nManager;

pub use fluent::{FluentArgs, FluentValue};
