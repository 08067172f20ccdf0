//! The library code for the `wintersun` static site generator. A build is
//! generally broken down into two steps:
//!
//! 1. Walking the source tree, parsing each markdown document once
//!    ([`crate::cache`], [`crate::markdown`]) into a [`crate::post::Post`],
//!    collecting the posts ([`crate::repo`]) and rendering each one into the
//!    mirrored output tree ([`crate::page`]).
//! 2. Presenting the collected posts: an Atom feed ([`crate::feed`]), one page
//!    per tag ([`crate::tag`]) and one chronological archive per category
//!    ([`crate::archive`]).
//!
//! [`crate::build::build_site`] drives both steps from a
//! [`crate::config::Config`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod build;
pub mod cache;
pub mod config;
pub mod feed;
pub mod link;
pub mod markdown;
pub mod page;
pub mod post;
pub mod render;
pub mod repo;
pub mod summary;
pub mod tag;
pub mod value;
