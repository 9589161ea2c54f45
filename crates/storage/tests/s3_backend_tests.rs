use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use bytes::Bytes;
use prism_storage::{ObjectStore, PutOptions, S3Backend, StorageError};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::{ContainerAsync, GenericImage, ImageExt, runners::AsyncRunner};

const MINIO_IMAGE: &str = "minio/minio";
const MINIO_TAG: &str = "RELEASE.2024-02-12T21-36-45Z";
const BUCKET: &str = "prism-test";

fn should_skip_s3_tests() -> bool {
    std::env::var("SKIP_S3_TESTS").is_ok()
}

struct MinioContext {
    _container: ContainerAsync<GenericImage>,
    endpoint: String,
    access_key: String,
    secret_key: String,
}

impl MinioContext {
    async fn new() -> Result<Self, String> {
        let access_key = "minio-access-key".to_string();
        let secret_key = "minio-secret-key".to_string();

        let container: ContainerAsync<GenericImage> = GenericImage::new(MINIO_IMAGE, MINIO_TAG)
            .with_exposed_port(9000.tcp())
            .with_wait_for(WaitFor::message_on_stdout("API:"))
            .with_env_var("MINIO_ROOT_USER", access_key.clone())
            .with_env_var("MINIO_ROOT_PASSWORD", secret_key.clone())
            .with_cmd(vec!["server", "/data"])
            .start()
            .await
            .map_err(|e| format!("failed to start MinIO container: {e}"))?;

        let host = container
            .get_host()
            .await
            .map_err(|e| format!("failed to get host: {e}"))?;
        let port = container
            .get_host_port_ipv4(9000.tcp())
            .await
            .map_err(|e| format!("failed to get port: {e}"))?;

        Ok(Self {
            _container: container,
            endpoint: format!("http://{host}:{port}"),
            access_key,
            secret_key,
        })
    }

    /// Raw client for checks the backend does not expose.
    fn client(&self) -> Client {
        let credentials = Credentials::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            None,
            None,
            "test",
        );
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(credentials)
            .http_client(aws_smithy_http_client::Builder::new().build_http())
            .endpoint_url(self.endpoint.clone())
            .force_path_style(true)
            .build();
        Client::from_conf(config)
    }

    async fn create_bucket(&self) -> Result<(), String> {
        self.client()
            .create_bucket()
            .bucket(BUCKET)
            .send()
            .await
            .map_err(|e| format!("failed to create bucket: {e}"))?;
        Ok(())
    }
}

struct S3TestHarness {
    context: MinioContext,
    backend: S3Backend,
}

impl S3TestHarness {
    async fn new(prefix: Option<String>) -> Result<Self, String> {
        let context = MinioContext::new().await?;
        context.create_bucket().await?;

        let backend = S3Backend::new(
            BUCKET,
            Some(context.endpoint.clone()),
            Some("us-east-1".to_string()),
            prefix,
            Some(context.access_key.clone()),
            Some(context.secret_key.clone()),
            true,
        )
        .await
        .map_err(|e| format!("failed to create S3 backend: {e}"))?;

        Ok(Self {
            context,
            backend,
        })
    }
}

#[tokio::test]
async fn test_s3_put_records_headers() {
    if should_skip_s3_tests() {
        return;
    }

    let harness = match S3TestHarness::new(Some("cdn".to_string())).await {
        Ok(harness) => harness,
        Err(err) => {
            eprintln!("Skipping S3 test: {err}");
            return;
        }
    };
    let backend = &harness.backend;
    let key = "dist/image/media/m1s10x10z.jpg.webp";

    backend.health_check().await.unwrap();
    assert!(!backend.exists(key).await.unwrap());

    backend
        .put(
            key,
            Bytes::from_static(b"RIFF....WEBP"),
            &PutOptions::image("image/webp", "max-age=31536000,public,immutable".into()),
        )
        .await
        .unwrap();

    assert!(backend.exists(key).await.unwrap());
    let head = harness
        .context
        .client()
        .head_object()
        .bucket(BUCKET)
        .key(format!("cdn/{key}"))
        .send()
        .await
        .unwrap();
    assert_eq!(head.content_length(), Some(12));
    assert_eq!(head.content_type(), Some("image/webp"));
    assert_eq!(
        head.cache_control(),
        Some("max-age=31536000,public,immutable")
    );
    assert_eq!(
        backend.get(key).await.unwrap(),
        Bytes::from_static(b"RIFF....WEBP")
    );
}

#[tokio::test]
async fn test_s3_missing_object_maps_to_not_found() {
    if should_skip_s3_tests() {
        return;
    }

    let harness = match S3TestHarness::new(None).await {
        Ok(harness) => harness,
        Err(err) => {
            eprintln!("Skipping S3 test: {err}");
            return;
        }
    };

    assert!(matches!(
        harness.backend.get("missing.png").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(!harness.backend.exists("missing.png").await.unwrap());
}
