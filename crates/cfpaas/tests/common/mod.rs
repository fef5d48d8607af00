use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const BLUEPRINT: &str = r#"
location:
  endpoint: https://api.run.example.com
  org: acme
  space: dev
  identity: deployer
  credential: secret

applications:
  - name: shop
    artifact: https://host/build/shop-1.2.3.war?sig=abc
    buildpack: java_buildpack
    domain: example.com
    memory: 1024
    services: [orders-db]
  - name: worker
    artifact: target/worker.jar

services:
  - offering: cleardb
    plan: spark
    instance_name: orders-db
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_blueprint(&self, content: &str) {
        fs::write(self.root.path().join("cfpaas.yaml"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// cfpaas command isolated from the user's config and CF environment
    pub fn command(&self) -> assert_cmd::Command {
        #[allow(deprecated)]
        let mut cmd = assert_cmd::Command::cargo_bin("cfpaas").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("CFPAAS_CONFIG_PATH");
        for var in ["CF_API", "CF_ORG", "CF_SPACE", "CF_USERNAME", "CF_PASSWORD"] {
            cmd.env_remove(var);
        }
        cmd
    }
}
