use crate::error::bad_request;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Narrows a collection of transactions by month, year and free-text search. Every field is
/// optional and an absent field places no constraint on that dimension.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_term: Option<String>,
}

impl FilterCriteria {
    /// Builds criteria from user input, rejecting a month outside of 1-12.
    pub fn new(month: Option<u32>, year: Option<i32>, search_term: Option<String>) -> Result<Self> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(bad_request(format!(
                    "The month must be between 1 and 12, got {m}"
                )));
            }
        }
        Ok(Self {
            month,
            year,
            search_term,
        })
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// The search term, treating an empty string as no term at all.
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|s| !s.is_empty())
    }

    /// True when no field constrains anything.
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none() && self.search_term().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{error_type, ErrorType};

    #[test]
    fn test_new_rejects_bad_month() {
        let err = FilterCriteria::new(Some(13), None, None).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
        assert!(FilterCriteria::new(Some(0), None, None).is_err());
        assert!(FilterCriteria::new(Some(12), Some(2024), None).is_ok());
    }

    #[test]
    fn test_empty_search_term_is_absent() {
        let criteria = FilterCriteria::default().with_search("");
        assert_eq!(criteria.search_term(), None);
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(FilterCriteria::default().is_empty());
        assert!(!FilterCriteria::default().with_year(2024).is_empty());
    }
}
