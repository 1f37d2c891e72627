// Client construction, option conflicts and key URI handling

use crate::integration::common::{
    create_static_kms, init_logger, write_credential_file, CSV_CREDENTIALS, INI_CREDENTIALS,
    KEY_URI, KEY_URI_PREFIX, ORIGINAL_DATA,
};
use awskms::client::{
    new_client_with_options, use_v2, with_credential_path, with_encryption_context_name,
    with_kms, with_v2_kms_options, AwsClientBuilder, ClientOption,
};
use awskms::plugins::aws_v2::kms::{with_api_timeout, with_v2_kms};
use awskms::uri::region_from_uri;
use awskms::{EncryptionContextName, Error, KmsClient};
use std::time::Duration;

fn assert_config_error(options: Vec<ClientOption>) {
    match new_client_with_options(KEY_URI_PREFIX, options) {
        Err(Error::Config(_)) => {}
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn test_region_extraction() {
    assert_eq!(region_from_uri(KEY_URI).unwrap(), "us-east-2");
    assert_eq!(region_from_uri(KEY_URI_PREFIX).unwrap(), "us-east-2");

    assert!(matches!(
        region_from_uri("aws-kms://aws:kms:us-east-2:235739564943:key/abcd"),
        Err(Error::RegionExtraction(_))
    ));
}

#[test]
fn test_supported_uses_literal_prefix() {
    let client = new_client_with_options(KEY_URI_PREFIX, Vec::<ClientOption>::new()).unwrap();

    assert!(client.supported(KEY_URI));
    assert!(client.supported(&format!("{}anything-at-all", KEY_URI_PREFIX)));
    assert!(!client.supported(&KEY_URI.to_uppercase()));
    assert!(!client.supported("aws-kms://arn:aws:kms:us-east-2:235739564943:alias/abcd"));

    // any structure under the prefix is accepted
    let broad = new_client_with_options("aws-kms://", Vec::<ClientOption>::new()).unwrap();
    assert!(broad.supported("aws-kms://not-an-arn"));
    assert!(!broad.supported("gcp-kms://projects/p"));
}

#[test]
fn test_invalid_prefix_fails_construction() {
    let result = new_client_with_options(
        "gcp-kms://projects/p/locations/global",
        [with_kms(create_static_kms())],
    );

    assert!(matches!(result, Err(Error::InvalidUriPrefix { .. })));
}

#[test]
fn test_handle_supplied_twice_fails() {
    let csv = write_credential_file(CSV_CREDENTIALS);

    assert_config_error(vec![with_kms(create_static_kms()), with_kms(create_static_kms())]);
    assert_config_error(vec![
        with_kms(create_static_kms()),
        with_credential_path(csv.path()),
    ]);
    assert_config_error(vec![
        with_credential_path(csv.path()),
        with_kms(create_static_kms()),
    ]);
    assert_config_error(vec![
        with_credential_path(csv.path()),
        with_credential_path(csv.path()),
    ]);
    assert_config_error(vec![with_v2_kms_options(vec![
        with_v2_kms(create_static_kms()),
        with_v2_kms(create_static_kms()),
    ])]);
}

#[test]
fn test_generation_conflicts_fail() {
    assert_config_error(vec![use_v2(), use_v2()]);
    assert_config_error(vec![use_v2(), with_v2_kms_options(vec![])]);
    assert_config_error(vec![with_kms(create_static_kms()), use_v2()]);
    assert_config_error(vec![use_v2(), with_kms(create_static_kms())]);
    assert_config_error(vec![
        with_v2_kms_options(vec![with_v2_kms(create_static_kms())]),
        with_kms(create_static_kms()),
    ]);
}

#[test]
fn test_encryption_context_name_set_twice_fails() {
    assert_config_error(vec![
        with_encryption_context_name(EncryptionContextName::AssociatedData),
        with_encryption_context_name(EncryptionContextName::AssociatedData),
    ]);
}

#[test]
fn test_single_handle_source_succeeds() {
    let csv = write_credential_file(CSV_CREDENTIALS);
    let ini = write_credential_file(INI_CREDENTIALS);

    let sources = vec![
        vec![with_kms(create_static_kms())],
        vec![with_credential_path(csv.path())],
        vec![with_credential_path(ini.path())],
        vec![with_v2_kms_options(vec![with_v2_kms(create_static_kms())])],
        vec![use_v2()],
        vec![],
    ];

    for options in sources {
        assert!(new_client_with_options(KEY_URI_PREFIX, options).is_ok());
    }
}

#[test]
fn test_credential_errors_fail_construction() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        new_client_with_options(KEY_URI_PREFIX, [with_credential_path("")]),
        Err(Error::MissingCredentialPath)
    ));
    assert!(matches!(
        new_client_with_options(
            KEY_URI_PREFIX,
            [with_credential_path(dir.path().join("credentials.csv"))]
        ),
        Err(Error::CannotOpenCredentialPath(_))
    ));

    // the legacy handle needs the region at build time
    let csv = write_credential_file(CSV_CREDENTIALS);
    assert!(matches!(
        new_client_with_options("aws-kms://", [with_credential_path(csv.path())]),
        Err(Error::RegionExtraction(_))
    ));
}

#[test]
fn test_options_apply_in_order() {
    // the duplicate fails even though a valid option follows it
    let result = AwsClientBuilder::new(KEY_URI_PREFIX)
        .with_kms(create_static_kms())
        .with_kms(create_static_kms())
        .with_encryption_context_name(EncryptionContextName::LegacyAdditionalData)
        .build();

    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("KMS handle")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_encryption_context_name_defaults() {
    let client = new_client_with_options(KEY_URI_PREFIX, [with_kms(create_static_kms())]).unwrap();
    assert_eq!(client.encryption_context_name(), EncryptionContextName::AssociatedData);

    let client = new_client_with_options(
        KEY_URI_PREFIX,
        [with_encryption_context_name(EncryptionContextName::LegacyAdditionalData)],
    )
    .unwrap();
    assert_eq!(client.encryption_context_name(), EncryptionContextName::LegacyAdditionalData);
}

#[test]
#[allow(deprecated)]
fn test_deprecated_constructors_pin_legacy_name() {
    let csv = write_credential_file(CSV_CREDENTIALS);

    let clients = [
        awskms::client::new_client(KEY_URI_PREFIX).unwrap(),
        awskms::client::new_client_with_credentials(KEY_URI_PREFIX, csv.path()).unwrap(),
        awskms::client::new_client_with_kms(KEY_URI_PREFIX, create_static_kms()).unwrap(),
    ];

    for client in clients {
        assert_eq!(client.encryption_context_name(), EncryptionContextName::LegacyAdditionalData);
        assert!(!client.uses_v2());
    }

    assert!(matches!(
        awskms::client::new_client("aws-gcp://"),
        Err(Error::InvalidUriPrefix { .. })
    ));
}

#[tokio::test]
async fn test_v2_client_with_explicit_handle() {
    init_logger();

    let client = AwsClientBuilder::new(KEY_URI_PREFIX)
        .with_v2_kms_options(vec![
            with_api_timeout(Duration::from_secs(1)),
            with_v2_kms(create_static_kms()),
        ])
        .build()
        .unwrap();

    let aead = client.get_aead(KEY_URI).await.unwrap();
    let ciphertext = aead.encrypt(ORIGINAL_DATA.as_bytes(), b"ad").await.unwrap();
    assert_eq!(
        aead.decrypt(&ciphertext, b"ad").await.unwrap(),
        ORIGINAL_DATA.as_bytes()
    );
}

#[tokio::test]
async fn test_resolve_reuses_handle_across_calls() {
    init_logger();
    let client = new_client_with_options(KEY_URI_PREFIX, [with_kms(create_static_kms())]).unwrap();

    // each call returns a fresh adapter over the same handle
    let first = client.get_aead(KEY_URI).await.unwrap();
    let second = client.get_aead(KEY_URI).await.unwrap();

    let ciphertext = first.encrypt(ORIGINAL_DATA.as_bytes(), b"ad").await.unwrap();
    assert_eq!(
        second.decrypt(&ciphertext, b"ad").await.unwrap(),
        ORIGINAL_DATA.as_bytes()
    );
}
