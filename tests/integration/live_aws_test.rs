// Round trips against a real AWS KMS key
//
// Run with `cargo test -- --ignored` after setting AWSKMS_TEST_KEY_URI to a
// key URI such as aws-kms://arn:aws:kms:us-east-2:<account>:key/<id>.
// AWSKMS_TEST_CREDENTIALS optionally names a credential file; otherwise the
// default credential chain is used.

use crate::integration::common::{init_logger, ORIGINAL_DATA};
use awskms::client::{new_client_with_options, use_v2, with_credential_path, with_v2_kms_options};
use awskms::plugins::aws_v2::kms;
use awskms::{AwsClient, ClientOption, KmsClient};
use std::env;

fn key_uri() -> String {
    env::var("AWSKMS_TEST_KEY_URI").expect("AWSKMS_TEST_KEY_URI must be set")
}

async fn assert_round_trip(client: AwsClient, key_uri: &str) {
    let aead = client.get_aead(key_uri).await.expect("Failed to get AEAD");

    let ciphertext = aead
        .encrypt(ORIGINAL_DATA.as_bytes(), b"associatedData")
        .await
        .expect("Failed to encrypt");

    let plaintext = aead
        .decrypt(&ciphertext, b"associatedData")
        .await
        .expect("Failed to decrypt");
    assert_eq!(plaintext, ORIGINAL_DATA.as_bytes());

    assert!(aead.decrypt(&ciphertext, b"otherData").await.is_err());
}

#[tokio::test]
#[ignore]
async fn test_live_legacy_round_trip() {
    init_logger();
    let key_uri = key_uri();

    let options: Vec<ClientOption> = match env::var("AWSKMS_TEST_CREDENTIALS") {
        Ok(path) => vec![with_credential_path(path)],
        Err(_) => vec![],
    };

    let client = new_client_with_options(key_uri.as_str(), options).expect("Failed to build client");
    assert_round_trip(client, &key_uri).await;
}

#[tokio::test]
#[ignore]
async fn test_live_v2_round_trip() {
    init_logger();
    let key_uri = key_uri();

    let option = match env::var("AWSKMS_TEST_CREDENTIALS") {
        Ok(path) => with_v2_kms_options(vec![kms::with_credential_path(path)]),
        Err(_) => use_v2(),
    };

    let client = new_client_with_options(key_uri.as_str(), [option]).expect("Failed to build client");
    assert_round_trip(client, &key_uri).await;
}
