use serde::Serialize;
use std::ops::Deref;
use uuid::Uuid;

#[derive(Eq, PartialEq, Clone, Debug, Serialize)]
pub(crate) struct RunId(Uuid);

impl RunId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Deref for RunId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of a successfully published page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshReport {
    pub(crate) run_id: RunId,
    pub(crate) video_count: usize,
    pub(crate) object_key: String,
    pub(crate) bytes: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum RefreshOutcomeBody {
    Success {
        message: String,
        #[serde(rename = "runId")]
        run_id: RunId,
        #[serde(rename = "videoCount")]
        video_count: usize,
    },
    Failure {
        error: String,
    },
}

/// Result of a run in the shape reported to whoever triggered it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshOutcome {
    pub(crate) status_code: u16,
    pub(crate) body: RefreshOutcomeBody,
}

impl RefreshOutcome {
    pub(crate) fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl<E: std::fmt::Display> From<Result<RefreshReport, E>> for RefreshOutcome {
    fn from(result: Result<RefreshReport, E>) -> Self {
        match result {
            Ok(report) => Self {
                status_code: 200,
                body: RefreshOutcomeBody::Success {
                    message: "Successfully updated page".to_string(),
                    run_id: report.run_id,
                    video_count: report.video_count,
                },
            },
            Err(error) => Self {
                status_code: 500,
                body: RefreshOutcomeBody::Failure {
                    error: error.to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RefreshOutcome, RefreshReport, RunId};
    use serde_json::json;

    #[test]
    fn should_report_success_with_200() {
        let run_id = RunId::new();
        let report = RefreshReport {
            run_id: run_id.clone(),
            video_count: 3,
            object_key: "index.html".into(),
            bytes: 1024,
        };

        let outcome = RefreshOutcome::from(Ok::<_, std::io::Error>(report));

        assert!(outcome.is_success());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "statusCode": 200,
                "body": {
                    "message": "Successfully updated page",
                    "runId": run_id.to_string(),
                    "videoCount": 3
                }
            })
        );
    }

    #[test]
    fn should_report_failure_with_500_and_message() {
        let outcome = RefreshOutcome::from(Err::<RefreshReport, _>(std::io::Error::new(
            std::io::ErrorKind::Other,
            "bucket is gone",
        )));

        assert!(!outcome.is_success());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "statusCode": 500, "body": { "error": "bucket is gone" } })
        );
    }
}
