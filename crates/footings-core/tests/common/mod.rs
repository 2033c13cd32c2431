#![allow(dead_code)]

use footings_core::{step, Argument, Attribute, Model, ModelDecl, ValueKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("rate table unavailable for start={0}")]
pub struct RateError(pub i64);

/// Modelo de tres steps: s1 -> a, s2 -> b, s3 -> c.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Three {
    pub start: i64,
    pub fail: bool,
    pub offset: i64,
    pub a: i64,
    pub b: i64,
    pub c: i64,
    #[serde(skip)]
    pub calls: Vec<String>,
}

impl Three {
    pub fn new(start: i64) -> Self {
        Self { start,
               fail: false,
               offset: 5,
               a: 0,
               b: 0,
               c: 0,
               calls: Vec::new() }
    }

    pub fn failing(start: i64) -> Self {
        Self { fail: true, ..Self::new(start) }
    }

    fn s1(&mut self) {
        self.calls.push("s1".into());
        self.a = self.start + 1;
    }

    fn s2(&mut self) -> Result<(), RateError> {
        self.calls.push("s2".into());
        if self.fail {
            return Err(RateError(self.start));
        }
        self.b = self.a * 10;
        Ok(())
    }

    fn s3(&mut self) {
        self.calls.push("s3".into());
        self.c = self.b + self.offset;
    }
}

impl Model for Three {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("Three").doc("Three chained steps.")
                               .attribute(Attribute::input("start").argument(Argument::new().dtype(ValueKind::Integer)
                                                                                            .min_val(0.0)
                                                                                            .description("Starting value.")))
                               .input("fail")
                               .constant("offset")
                               .intermediate("a")
                               .intermediate("b")
                               .output("c")
                               .step(step(Three::s1).uses(["start"]).impacts(["a"]).doc("Add one."))
                               .step(step(Three::s2).uses(["a"]).impacts(["b"]).doc("Scale by ten."))
                               .step(step(Three::s3).uses(["b", "offset"]).impacts(["c"]).doc("Add the offset."))
                               .steps(["s1", "s2", "s3"])
    }
}
