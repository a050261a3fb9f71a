//! Pattern flags for utterances suggesting the user may need assistance.

use crate::downstream::{
    Annotator,
    types::{AssistanceFlags, DownstreamError},
};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};

const DEPRESSION_PATTERN: &str = r"\b(suicide|depress|kill myself|die.\b|death)";
const BAD_DAY_PATTERN: &str = r"\b(bad day|awful day|hard day)";
const PROBLEMS_PATTERN: &str = r"\b(problem. with|trouble. with|feel.*? bad|feel.*? awful|tired|feel.*? sad|i'm sad|i am sad|i'm tired|i am tired)";

/// In-process detector evaluating the assistance patterns.
#[derive(Debug, Clone)]
pub struct AssistanceDetector {
    depression: Regex,
    bad_day: Regex,
    problems: Regex,
}

impl AssistanceDetector {
    /// Compile the assistance patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            depression: compile(DEPRESSION_PATTERN)?,
            bad_day: compile(BAD_DAY_PATTERN)?,
            problems: compile(PROBLEMS_PATTERN)?,
        })
    }

    /// Evaluate every pattern against `text`.
    pub fn flags(&self, text: &str) -> AssistanceFlags {
        AssistanceFlags {
            depression: self.depression.is_match(text),
            bad_day: self.bad_day.is_match(text),
            problems: self.problems.is_match(text),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[async_trait]
impl Annotator for AssistanceDetector {
    type Item = String;
    type Output = AssistanceFlags;

    fn name(&self) -> &'static str {
        "assistance"
    }

    async fn annotate(&self, item: &String) -> Result<AssistanceFlags, DownstreamError> {
        Ok(self.flags(item))
    }

    fn fallback(&self, _item: &String) -> AssistanceFlags {
        AssistanceFlags::default()
    }
}
