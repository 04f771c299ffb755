#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use nl_access as access;
pub use nl_utils as utils;
