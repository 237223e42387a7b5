//! Core library for genie
//!
//! This crate implements the **Functional Core** of the genie application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`genie_core`** (this crate): Pure transformation functions with zero I/O
//! - **`genie`**: Model calls, file writes and orchestration (the Imperative Shell)
//!
//! Everything here is deterministic: rendering a prompt, pulling a JSON object
//! out of a model reply, validating a plan, or serializing shared dependencies
//! needs no model and no filesystem, so it is tested with plain fixture data.
//!
//! # Module Organization
//!
//! - [`codegen`]: Domain types, prompt templates, response extraction and
//!   usage accounting for the three generation stages
//!
//! # Example Usage
//!
//! ```rust
//! use genie_core::codegen::{build_file_paths_prompt, parse_json_response, FilePathPlan};
//!
//! let prompt = build_file_paths_prompt("hello world in python").unwrap();
//! assert!(prompt.human.unwrap().contains("hello world in python"));
//!
//! let reply = "Sure!\n{\"reasoning\": [], \"file_paths\": [\"main.py\"]}";
//! let plan: FilePathPlan = parse_json_response(reply).unwrap();
//! assert_eq!(plan.file_paths, vec!["main.py"]);
//! ```

pub mod codegen;
