// Tests to verify the KMS handle is built once under concurrent first use

use crate::integration::common::{
    create_static_kms, init_logger, KEY_URI, KEY_URI_PREFIX, ORIGINAL_DATA, SECOND_KEY_URI,
};
use awskms::client::AwsClientBuilder;
use awskms::kms::KmsApi;
use awskms::plugins::aws_v2::kms::{with_kms_factory, with_load_options, LoadOption};
use awskms::KmsClient;
use aws_config::ConfigLoader;
use aws_sdk_kms::config::Credentials;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const NUM_TASKS: usize = 16;
const OPERATIONS_PER_TASK: usize = 10;

fn counting_client(builds: Arc<AtomicUsize>) -> Arc<awskms::AwsClient> {
    let kms = create_static_kms();
    let credentials: LoadOption = Arc::new(|loader: ConfigLoader| {
        loader.credentials_provider(Credentials::new("AKID", "SECRET", None, None, "test"))
    });

    let client = AwsClientBuilder::new(KEY_URI_PREFIX)
        .with_v2_kms_options(vec![
            with_load_options(vec![credentials]),
            with_kms_factory(move |_config: aws_sdk_kms::Config| -> Arc<dyn KmsApi> {
                builds.fetch_add(1, Ordering::SeqCst);
                kms.clone()
            }),
        ])
        .build()
        .expect("Failed to build client");

    Arc::new(client)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_builds_one_handle() {
    init_logger();
    let builds = Arc::new(AtomicUsize::new(0));
    let client = counting_client(builds.clone());

    let tasks = (0..NUM_TASKS).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            let key_uri = if i % 2 == 0 { KEY_URI } else { SECOND_KEY_URI };
            let aead = client.get_aead(key_uri).await.expect("Failed to get AEAD");

            for j in 0..OPERATIONS_PER_TASK {
                let ad = format!("task-{}-op-{}", i, j);
                let ciphertext = aead
                    .encrypt(ORIGINAL_DATA.as_bytes(), ad.as_bytes())
                    .await
                    .expect("Failed to encrypt");
                let plaintext = aead
                    .decrypt(&ciphertext, ad.as_bytes())
                    .await
                    .expect("Failed to decrypt");
                assert_eq!(plaintext, ORIGINAL_DATA.as_bytes());
            }
        })
    });

    for result in join_all(tasks).await {
        result.expect("Task panicked");
    }

    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_call_does_not_affect_others() {
    init_logger();
    let builds = Arc::new(AtomicUsize::new(0));
    let client = counting_client(builds.clone());

    let aead = client.get_aead(KEY_URI).await.unwrap();

    // drop one in-flight encrypt before it is polled to completion
    let cancelled = tokio::spawn({
        let aead = aead.clone();
        async move { aead.encrypt(b"cancelled", b"ad").await }
    });
    cancelled.abort();

    let ciphertext = aead.encrypt(ORIGINAL_DATA.as_bytes(), b"ad").await.unwrap();
    assert_eq!(
        aead.decrypt(&ciphertext, b"ad").await.unwrap(),
        ORIGINAL_DATA.as_bytes()
    );
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}
