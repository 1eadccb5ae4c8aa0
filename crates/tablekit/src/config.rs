//! AWS SDK client setup (Imperative Shell).

use aws_sdk_dynamodb::Client;

use crate::cli::Global;

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl AwsConfig {
    /// Takes the endpoint and region from the parsed global options, which
    /// already fall back to `AWS_ENDPOINT_URL` and `AWS_REGION`.
    pub fn from_global(global: &Global) -> Self {
        Self {
            endpoint_url: global.endpoint_url.clone().filter(|url| !url.is_empty()),
            region: global.region.clone(),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client. Credentials come from the default provider chain.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Backend, OutputFormat};

    fn global(endpoint_url: Option<&str>) -> Global {
        Global {
            endpoint_url: endpoint_url.map(str::to_string),
            region: "eu-west-1".to_string(),
            table_name: "Movies".to_string(),
            backend: Backend::Dynamodb,
            format: OutputFormat::Pretty,
            silent: false,
            verbose: false,
        }
    }

    #[test]
    fn test_target_display_local() {
        let config = AwsConfig::from_global(&global(Some("http://localhost:8000")));
        assert_eq!(config.target_display(), "Local DynamoDB (http://localhost:8000)");
    }

    #[test]
    fn test_target_display_aws() {
        let config = AwsConfig::from_global(&global(None));
        assert_eq!(config.target_display(), "AWS DynamoDB (region: eu-west-1)");
    }

    #[test]
    fn test_empty_endpoint_is_ignored() {
        let config = AwsConfig::from_global(&global(Some("")));
        assert_eq!(config.endpoint_url, None);
    }
}
