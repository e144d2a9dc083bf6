use aws_sdk_s3::Client as S3Client;
use aws_sdk_ssm::Client as SsmClient;
use tracing::warn;

use crate::{CustomizerConfig, MessageTemplate, TriggerKind};

/// Fetches message templates from the parameter store and the template
/// bucket. Every read failure degrades to the compiled-in defaults; the
/// customizer never fails an invocation over storage.
pub struct TemplateService {
    ssm: SsmClient,
    s3: S3Client,
    config: CustomizerConfig,
}

impl TemplateService {
    pub fn new(ssm: SsmClient, s3: S3Client, config: CustomizerConfig) -> Self {
        Self { ssm, s3, config }
    }

    pub fn config(&self) -> &CustomizerConfig {
        &self.config
    }

    /// Resolve the template for a trigger: subject from the parameter store,
    /// body from the bucket with the parameter store as fallback.
    pub async fn template_for(&self, kind: TriggerKind) -> MessageTemplate {
        let subject = self
            .get_parameter(&self.config.parameter_name(&format!("{}/Subject", kind.source())))
            .await;

        let message_key = format!("{}/Message", kind.source());
        let message = match self.get_object(&self.config.object_key(&message_key)).await {
            Some(body) => Some(body),
            None => self.get_parameter(&self.config.parameter_name(&message_key)).await,
        };

        MessageTemplate::resolve(kind, subject, message)
    }

    /// Base URL for confirmation links, stored alongside the templates.
    pub async fn http_api_url(&self) -> Option<String> {
        self.get_parameter(&self.config.parameter_name("CognitoHttpApiUrl"))
            .await
    }

    async fn get_parameter(&self, name: &str) -> Option<String> {
        match self.ssm.get_parameter().name(name).send().await {
            Ok(output) => output.parameter().and_then(|p| p.value().map(str::to_string)),
            Err(e) => {
                warn!("Parameter {} not readable: {}", name, e.into_service_error());
                None
            }
        }
    }

    async fn get_object(&self, key: &str) -> Option<String> {
        let output = match self
            .s3
            .get_object()
            .bucket(&self.config.s3_bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Object {} not readable: {}", key, e.into_service_error());
                return None;
            }
        };

        match output.body.collect().await {
            Ok(data) => match String::from_utf8(data.into_bytes().to_vec()) {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!("Object {} is not utf-8: {}", key, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read object {}: {}", key, e);
                None
            }
        }
    }
}
