//! Environment-derived boot data
//!
//! Object storage credentials and the compute region are passed to nodes
//! from the provisioning process's environment. Each bundle is read in one
//! step and formatted separately; a bundle whose primary variable is unset
//! or empty produces no output at all.

use std::collections::{BTreeMap, HashMap};

use zeroize::Zeroizing;

/// Read-only view of environment variables
pub trait EnvSource: Send + Sync {
    /// Value of `name`, if set
    fn var(&self, name: &str) -> Option<String>;
}

/// The provisioning process's environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Credentials for an S3-compatible object store
#[derive(Clone)]
pub struct S3Credentials {
    endpoint: String,
    region: String,
    access_key_id: String,
    secret_access_key: Zeroizing<String>,
}

impl S3Credentials {
    /// Read the bundle; `None` unless `S3_ENDPOINT` is non-empty
    ///
    /// Other members default to the empty string when unset.
    pub fn read(env: &dyn EnvSource) -> Option<Self> {
        let endpoint = env.var("S3_ENDPOINT").filter(|v| !v.is_empty())?;
        Some(Self {
            endpoint,
            region: env.var("S3_REGION").unwrap_or_default(),
            access_key_id: env.var("S3_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: Zeroizing::new(
                env.var("S3_SECRET_ACCESS_KEY").unwrap_or_default(),
            ),
        })
    }

    /// Object store endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Shell export lines, one per member, in fixed order
    pub fn exports(&self) -> String {
        format!(
            "export S3_ENDPOINT={}\nexport S3_REGION={}\nexport S3_ACCESS_KEY_ID={}\nexport S3_SECRET_ACCESS_KEY={}\n",
            self.endpoint,
            self.region,
            self.access_key_id,
            self.secret_access_key.as_str()
        )
    }
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Compute region nodes run in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Read `AWS_REGION`; `None` unless non-empty
    pub fn read(env: &dyn EnvSource) -> Option<Self> {
        env.var("AWS_REGION").filter(|v| !v.is_empty()).map(Self)
    }

    /// Region name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shell export line
    pub fn exports(&self) -> String {
        format!("export AWS_REGION={}\n", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // =========================================================================
    // Story: Object Storage Bundle
    // =========================================================================

    #[test]
    fn test_s3_bundle_requires_endpoint() {
        assert!(S3Credentials::read(&env(&[])).is_none());
        assert!(S3Credentials::read(&env(&[("S3_ENDPOINT", "")])).is_none());
        assert!(S3Credentials::read(&env(&[("S3_REGION", "us-east-1")])).is_none());
    }

    #[test]
    fn test_s3_bundle_exports_every_member() {
        let creds = S3Credentials::read(&env(&[
            ("S3_ENDPOINT", "https://minio.local:9000"),
            ("S3_REGION", "us-east-1"),
            ("S3_ACCESS_KEY_ID", "AKID"),
            ("S3_SECRET_ACCESS_KEY", "s3cr3t"),
        ]))
        .expect("endpoint is set");

        assert_eq!(creds.endpoint(), "https://minio.local:9000");
        assert_eq!(
            creds.exports(),
            "export S3_ENDPOINT=https://minio.local:9000\n\
export S3_REGION=us-east-1\n\
export S3_ACCESS_KEY_ID=AKID\n\
export S3_SECRET_ACCESS_KEY=s3cr3t\n"
        );
    }

    #[test]
    fn test_s3_bundle_unset_members_are_empty() {
        let creds = S3Credentials::read(&env(&[("S3_ENDPOINT", "e")])).unwrap();
        assert_eq!(
            creds.exports(),
            "export S3_ENDPOINT=e\nexport S3_REGION=\nexport S3_ACCESS_KEY_ID=\nexport S3_SECRET_ACCESS_KEY=\n"
        );
    }

    #[test]
    fn test_s3_debug_redacts_secret() {
        let creds = S3Credentials::read(&env(&[
            ("S3_ENDPOINT", "e"),
            ("S3_SECRET_ACCESS_KEY", "s3cr3t"),
        ]))
        .unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("s3cr3t"));
    }

    // =========================================================================
    // Story: Region Bundle
    // =========================================================================

    #[test]
    fn test_region_bundle() {
        assert!(AwsRegion::read(&env(&[])).is_none());
        assert!(AwsRegion::read(&env(&[("AWS_REGION", "")])).is_none());

        let region = AwsRegion::read(&env(&[("AWS_REGION", "eu-west-1")])).unwrap();
        assert_eq!(region.as_str(), "eu-west-1");
        assert_eq!(region.exports(), "export AWS_REGION=eu-west-1\n");
    }

    #[test]
    fn test_hashmap_source() {
        let mut map = HashMap::new();
        map.insert("AWS_REGION".to_string(), "us-west-2".to_string());
        assert_eq!(map.var("AWS_REGION").as_deref(), Some("us-west-2"));
        assert_eq!(map.var("S3_ENDPOINT"), None);
    }
}
