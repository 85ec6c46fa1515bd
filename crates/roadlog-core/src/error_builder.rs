use crate::problemdetails;
use axum::http::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

pub struct ErrorBuilder {
    status: StatusCode,
    type_: String,
    title: String,
    detail: String,
    instance: String,
    values: HashMap<String, serde_json::Value>,
}

impl ErrorBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            type_: String::new(),
            title: String::new(),
            detail: String::new(),
            instance: String::new(),
            values: HashMap::new(),
        }
    }

    pub fn type_(mut self, type_: impl Into<String>) -> Self {
        self.type_ = type_.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn value<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.values.insert(key.to_string(), value);
        }
        self
    }

    /// Fields left empty are omitted from the problem body.
    pub fn build(self) -> problemdetails::Problem {
        let mut problem = problemdetails::new(self.status)
            .with_value("timestamp", chrono::Utc::now().to_rfc3339());

        for (key, field) in [
            ("type", self.type_),
            ("title", self.title),
            ("detail", self.detail),
            ("instance", self.instance),
        ] {
            if !field.is_empty() {
                problem = problem.with_value(key, field);
            }
        }

        for (key, value) in self.values {
            problem = problem.with_value(&key, value);
        }

        problem
    }
}

pub fn internal_server_error() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
        .type_("https://roadlog.app/probs/internal-server-error")
        .title("Internal Server Error")
        .detail("An unexpected error occurred while processing your request")
        .value("error_code", "INTERNAL_SERVER_ERROR")
}

pub fn bad_request() -> ErrorBuilder {
    ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .type_("https://roadlog.app/probs/bad-request")
        .title("Bad Request")
        .detail("The request was malformed or invalid")
        .value("error_code", "BAD_REQUEST")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_builder_overrides_detail() {
        let problem = bad_request()
            .detail("max_rows must be positive")
            .instance("/analytics/growth")
            .build();

        assert_eq!(problem.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(problem.body["detail"], "max_rows must be positive");
        assert_eq!(problem.body["instance"], "/analytics/growth");
        assert_eq!(problem.body["error_code"], "BAD_REQUEST");
        assert!(problem.body.contains_key("timestamp"));
    }

    #[test]
    fn test_internal_server_error_defaults() {
        let problem = internal_server_error().build();
        assert_eq!(problem.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(problem.body["title"], "Internal Server Error");
    }

    #[test]
    fn test_unset_instance_is_omitted() {
        let problem = bad_request().detail("as_of is not a timestamp").build();

        assert!(!problem.body.contains_key("instance"));
        assert_eq!(problem.body["detail"], "as_of is not a timestamp");
    }
}
