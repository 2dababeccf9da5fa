//! isodep-lib: platform-conditional dependency descriptors
//!
//! This crate reads, merges and canonicalizes descriptors that declare what a
//! task depends on, per target platform:
//! - `descriptor`: the descriptor text format and file loading
//! - `store`: condition-keyed `ConfigStore`, `union` and `flatten`
//! - `reduce`: collapsing per-platform data back into minimal conditions
//! - `pretty`: deterministic descriptor text
//! - `manifest`: the resolved `.isolated` and `.state` records
//!
//! # Example
//!
//! ```
//! use isodep_lib::config::EngineConfig;
//! use isodep_lib::descriptor::Descriptor;
//! use isodep_lib::pretty::to_pretty_string;
//! use isodep_lib::reduce::{convert_map_to_isolate_dict, invert_map, reduce_inputs};
//!
//! let config = EngineConfig::default();
//! let text = r#"{
//!   'conditions': [
//!     ['OS=="linux"', {'variables': {'isolate_dependency_tracked': ['a', 'b']}}],
//!     ['OS=="mac"', {'variables': {'isolate_dependency_tracked': ['b', 'a']}}],
//!   ],
//! }"#;
//!
//! let store = Descriptor::parse(text, &config).unwrap().into_store(&config).unwrap();
//! let (inverted, platforms) = invert_map(&store.flatten_known());
//! let reduced = reduce_inputs(&inverted, &platforms).unwrap();
//! let canonical = convert_map_to_isolate_dict(&reduced).unwrap();
//!
//! assert!(canonical.conditions.is_empty());
//! assert!(to_pretty_string(&canonical, &config).contains("'a',\n"));
//! ```

pub mod config;
pub mod consts;
pub mod descriptor;
pub mod manifest;
pub mod platform;
pub mod pretty;
pub mod reduce;
pub mod store;
pub mod util;
pub mod variables;
