//! Static analysis of decorated TypeScript controllers.
//!
//! The analyzer walks an API project, finds its controllers and the modules
//! they belong to, describes every HTTP method they expose and extracts the
//! types those methods depend on into standalone declarations.

pub mod analyzer;
pub mod classdeps;
pub mod content;
pub mod controller;
pub mod decorator;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod methods;
pub mod modules;
pub mod params;
pub mod route;
pub mod source;
pub mod typedeps;

pub use analyzer::{AnalysisOutput, AnalyzerOptions, analyze_project};
pub use content::SdkContent;
pub use controller::SdkController;
pub use diagnostics::Warnings;
pub use error::AnalyzerError;
pub use extractor::{ExtractedType, TypeLocation, TypeLocationWithExt, TypesExtractor};
pub use methods::{HttpMethod, SdkMethod};
pub use modules::SdkModules;
pub use params::{SdkMethodBody, SdkMethodParams};
pub use route::{Route, RoutePart};
pub use typedeps::ResolvedTypeDeps;
