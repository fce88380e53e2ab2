// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Adapters from the JSON formats of V8's inspector protocol to owned
//! [CallTree]s: `.cpuprofile` files from the CPU profiler, and the sampling
//! heap profiler's output.
//!
//! [CallTree]: crate::tree::arena::CallTree

pub mod cpuprofile;
pub mod heapprofile;

pub use cpuprofile::CpuProfile;
pub use heapprofile::SamplingHeapProfile;

use crate::tree::arena::Frame;
use serde::{Deserialize, Serialize};

/// Where a node's code lives. Line and column numbers are 0-based, and are
/// negative when unknown.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallFrame {
    pub function_name: String,
    pub url: String,
    pub line_number: i64,
    pub column_number: i64,
}

impl CallFrame {
    /// The frame as V8's native profiler API reports it: 1-based lines, and
    /// line 0 when unknown.
    pub fn to_frame(&self) -> Frame {
        let line_number = if self.line_number < 0 {
            0
        } else {
            self.line_number.saturating_add(1)
        };
        Frame::new(&self.function_name, &self.url, line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_become_one_based() {
        let call_frame: CallFrame = serde_json::from_str(
            r#"{"functionName":"f","scriptId":"12","url":"file:///a.js","lineNumber":4,"columnNumber":2}"#,
        )
        .unwrap();
        assert_eq!(call_frame.to_frame(), Frame::new("f", "file:///a.js", 5));

        let native = CallFrame {
            function_name: "(garbage collector)".into(),
            line_number: -1,
            ..CallFrame::default()
        };
        assert_eq!(native.to_frame().line_number, 0);
        assert_eq!(native.to_frame().script_name, "");
    }
}
