use std::collections::BTreeMap;
use std::path::Path;

use samgraft_core::{BuildEnv, BuildOutput, ContainerSpec, DEFAULT_REGION, REGION_VAR};

// ── BuildEnv ──

#[test]
fn build_env_sets_region_when_absent() {
    let env = BuildEnv::from_vars([("PATH".to_owned(), "/usr/bin".to_owned())]);

    assert_eq!(env.get(REGION_VAR), Some("us-east-1"));
    assert_eq!(env.get("PATH"), Some("/usr/bin"));
}

#[test]
fn build_env_keeps_caller_region() {
    let env = BuildEnv::from_vars([(REGION_VAR.to_owned(), "eu-west-1".to_owned())]);

    assert_eq!(env.get(REGION_VAR), Some("eu-west-1"));
}

#[test]
fn build_env_keeps_empty_caller_region() {
    let env = BuildEnv::from_vars([(REGION_VAR.to_owned(), String::new())]);

    assert_eq!(env.get(REGION_VAR), Some(""));
}

#[test]
fn build_env_inherit_snapshots_process_environment() {
    let env = BuildEnv::inherit();

    assert!(env.get(REGION_VAR).is_some());
    if let Ok(path) = std::env::var("PATH") {
        assert_eq!(env.get("PATH"), Some(path.as_str()));
    }
    match std::env::var(REGION_VAR) {
        Ok(region) => assert_eq!(env.get(REGION_VAR), Some(region.as_str())),
        Err(_) => assert_eq!(env.get(REGION_VAR), Some(DEFAULT_REGION)),
    }
}

#[cfg(unix)]
#[test]
fn build_env_inherit_keeps_non_utf8_variables() {
    use std::ffi::{OsStr, OsString};
    use std::os::unix::ffi::OsStrExt;

    let latin1 = OsStr::from_bytes(b"caf\xe9");
    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("SAMGRAFT_TEST_LATIN1", latin1) };

    let env = BuildEnv::inherit();

    assert_eq!(
        env.vars().get(&OsString::from("SAMGRAFT_TEST_LATIN1")),
        Some(&latin1.to_os_string())
    );
    assert_eq!(env.get_os("SAMGRAFT_TEST_LATIN1"), Some(latin1));
    assert_eq!(env.get("SAMGRAFT_TEST_LATIN1"), None);
}

#[test]
fn build_env_from_os_vars_applies_region_default() {
    use std::ffi::OsString;

    let env = BuildEnv::from_os_vars([(OsString::from("HOME"), OsString::from("/home/me"))]);

    assert_eq!(env.get(REGION_VAR), Some(DEFAULT_REGION));
    assert_eq!(env.get("HOME"), Some("/home/me"));
}

// ── ContainerSpec ──

#[test]
fn container_spec_empty_image_uses_default() {
    let spec = ContainerSpec::new("", BTreeMap::new(), vec![]);

    assert_eq!(spec.image(), "lambci/lambda:build-python3.8");
}

#[test]
fn container_spec_blank_image_uses_default() {
    let spec = ContainerSpec::new("   ", BTreeMap::new(), vec![]);

    assert_eq!(spec.image(), "lambci/lambda:build-python3.8");
}

#[test]
fn container_spec_keeps_explicit_image() {
    let spec = ContainerSpec::new("my/builder:latest", BTreeMap::new(), vec![]);

    assert_eq!(spec.image(), "my/builder:latest");
}

#[test]
fn container_spec_default_image_follows_python_version() {
    let spec = ContainerSpec::with_python_version("", "3.6", BTreeMap::new(), vec![]);

    assert_eq!(spec.image(), "lambci/lambda:build-python3.6");
}

#[test]
fn container_spec_env_gets_region_default() {
    let env = BTreeMap::from([("SSH_KEY".to_owned(), "secret".to_owned())]);
    let spec = ContainerSpec::new("", env, vec![]);

    assert_eq!(
        spec.env().get(REGION_VAR).map(String::as_str),
        Some(DEFAULT_REGION)
    );
    assert_eq!(spec.env().get("SSH_KEY").map(String::as_str), Some("secret"));
}

#[test]
fn container_spec_env_keeps_caller_region() {
    let env = BTreeMap::from([(REGION_VAR.to_owned(), "ap-northeast-1".to_owned())]);
    let spec = ContainerSpec::new("", env, vec![]);

    assert_eq!(
        spec.env().get(REGION_VAR).map(String::as_str),
        Some("ap-northeast-1")
    );
}

#[test]
fn container_spec_preserves_init_command_order() {
    let commands = vec![
        "pip install awscli --upgrade".to_owned(),
        "pip install chalice".to_owned(),
    ];
    let spec = ContainerSpec::new("", BTreeMap::new(), commands.clone());

    assert_eq!(spec.init_commands(), commands.as_slice());
}

// ── BuildOutput ──

#[test]
fn build_output_allocates_unique_directories_under_root() {
    let root = Path::new("/tmp/chalice.out");
    let a = BuildOutput::allocate(root);
    let b = BuildOutput::allocate(root);

    assert_ne!(a.dir(), b.dir());
    assert_eq!(a.dir().parent(), Some(root));

    let name = a.dir().file_name().unwrap().to_str().unwrap();
    assert_eq!(name.len(), 32);
    assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn build_output_artifact_paths() {
    let output = BuildOutput::at("/tmp/chalice.out/abc");

    assert_eq!(
        output.manifest_path(),
        Path::new("/tmp/chalice.out/abc/sam.json")
    );
    assert_eq!(
        output.archive_path(),
        Path::new("/tmp/chalice.out/abc/deployment.zip")
    );
}
