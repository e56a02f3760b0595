//! gml-exchange: Moving musical data between sibling GML apps
//!
//! An export wraps a request in the universal envelope and hands it to the
//! target app either inline in the URL (`?import=`) or through a key-value
//! store (`?importKey=`). The import side reads an injected inbound source,
//! never ambient globals.

pub mod envelope;
pub mod export;
pub mod import;
pub mod registry;
pub mod store;

pub use envelope::{Content, ContentType, Envelope, ExportPayload, Metadata};
pub use export::{validate_export, Delivery, ExportError, ExportSettings, Exporter, ValidationReport};
pub use import::{ImportHandler, ImportRecord, ImportStatus, InboundSource, QueryParams};
pub use registry::{AppRegistry, Environment, SiblingApp};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
