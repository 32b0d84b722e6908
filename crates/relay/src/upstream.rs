use crate::settings::{AuthToken, Endpoint};
use serde_json::Value;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Service {
    #[strum(to_string = "leetcode", serialize = "lc")]
    LeetCode,
    #[strum(to_string = "github", serialize = "gh")]
    GitHub,
}

impl Service {
    pub fn default_endpoint(self) -> Endpoint {
        match self {
            Self::LeetCode => Endpoint::new("https://leetcode.com/graphql"),
            Self::GitHub => Endpoint::new("https://api.github.com/graphql"),
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            Self::LeetCode => "/api/leetcode",
            Self::GitHub => "/api/github",
        }
    }

    /// Body returned to the caller whenever relaying fails, whatever the cause.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::LeetCode => "Failed to fetch LeetCode data",
            Self::GitHub => "Failed to fetch GitHub data",
        }
    }
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct Upstream {
    pub service: Service,
    pub endpoint: Endpoint,
    pub token: Option<AuthToken>,
}

impl Upstream {
    /// Posts `body` unchanged and decodes the reply as JSON. The upstream
    /// status is not inspected; GraphQL reports its own errors in the body.
    pub async fn forward(
        &self,
        client: &reqwest::Client,
        body: &Value,
    ) -> Result<Value, ForwardError> {
        let mut request = client.post(self.endpoint.as_str()).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        log::debug!(
            "{} upstream {} replied {}",
            self.service,
            self.endpoint,
            response.status()
        );
        Ok(response.json::<Value>().await?)
    }
}

pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    // GitHub rejects requests without a user agent.
    reqwest::Client::builder()
        .user_agent(concat!("relay/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_service_parsing() {
        let cases = vec![
            ("leetcode", Service::LeetCode),
            ("LeetCode", Service::LeetCode),
            ("lc", Service::LeetCode),
            ("github", Service::GitHub),
            ("GH", Service::GitHub),
        ];

        for (input, expected) in cases {
            assert_eq!(Service::from_str(input).unwrap(), expected);
        }
        assert!(Service::from_str("gitlab").is_err());
    }

    #[test]
    fn test_routes_are_distinct() {
        let routes: Vec<_> = Service::iter().map(Service::route).collect();
        assert_eq!(routes, vec!["/api/leetcode", "/api/github"]);
        assert_eq!(Service::GitHub.to_string(), "github");
    }
}
