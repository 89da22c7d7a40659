use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use gcs_resizer::oss::{
    BucketMeta, ListOptions, ListPage, ObjectMeta, ObjectStore, ObjectStoreError, PageToken,
    PutOptions,
};
use gcs_resizer::pipeline::{
    BucketLister, Driver, ImageSourceConfig, PipelineConfig, PipelineError,
};
use gcs_resizer::transform::JpegResizer;

const TARGET: &str = "leyKart-images/B1/G1.png";

/// Store that replays a fixed sequence of list pages and records writes
struct ScriptedStore {
    pages: Vec<Vec<ObjectMeta>>,
    /// Zero-based page index whose list call fails
    fail_on_page: Option<usize>,
    objects: Mutex<Vec<(String, Bytes)>>,
    list_calls: Mutex<Vec<Option<String>>>,
    puts: Mutex<Vec<(String, Option<String>, Bytes)>>,
    acls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedStore {
    fn new(pages: Vec<Vec<ObjectMeta>>) -> Self {
        Self {
            pages,
            fail_on_page: None,
            objects: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
            puts: Mutex::new(Vec::new()),
            acls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, page: usize) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    fn with_object(self, key: &str, data: Bytes) -> Self {
        self.objects.lock().unwrap().push((key.to_string(), data));
        self
    }

    fn put_keys(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for ScriptedStore {
    fn bucket(&self) -> &str {
        "scripted-bucket"
    }

    async fn get_bucket(&self) -> Result<BucketMeta, ObjectStoreError> {
        Ok(BucketMeta {
            name: "scripted-bucket".to_string(),
            location: "US".to_string(),
            created: None,
            owner: Some("project-owners-123".to_string()),
        })
    }

    async fn list_page(
        &self,
        _options: &ListOptions,
        page_token: Option<&PageToken>,
    ) -> Result<ListPage, ObjectStoreError> {
        self.list_calls
            .lock()
            .unwrap()
            .push(page_token.map(|t| t.as_str().to_string()));

        let index = match page_token {
            None => 0,
            Some(token) => token
                .as_str()
                .strip_prefix('t')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ObjectStoreError::InvalidInput(format!("bad token {}", token)))?,
        };

        if self.fail_on_page == Some(index) {
            return Err(ObjectStoreError::Network(format!(
                "connection reset on page {}",
                index + 1
            )));
        }

        let objects = self.pages.get(index).cloned().unwrap_or_default();
        // tokens t1..t(N-1); the last page answers with an empty token
        let raw = if index + 1 < self.pages.len() {
            format!("t{}", index + 1)
        } else {
            String::new()
        };

        Ok(ListPage {
            objects,
            next_page_token: PageToken::from_response(Some(raw)),
        })
    }

    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        options: PutOptions,
    ) -> Result<(), ObjectStoreError> {
        self.acls
            .lock()
            .unwrap()
            .push((key.to_string(), options.predefined_acl.clone()));
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), options.content_type, value));
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn delete_object(&self, _key: &str) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}

fn meta(key: &str, content_type: &str) -> ObjectMeta {
    ObjectMeta::new(key, 42, Some(content_type))
}

fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = DynamicImage::new_rgb8(width, height);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

fn authenticated_config() -> PipelineConfig {
    PipelineConfig {
        image_source: ImageSourceConfig::Authenticated,
        ..Default::default()
    }
}

fn keys(objects: &[ObjectMeta]) -> Vec<&str> {
    objects.iter().map(|meta| meta.key.as_str()).collect()
}

#[tokio::test]
async fn test_list_all_returns_every_page_in_order() {
    let pages = vec![
        vec![meta("a", "text/plain"), meta("b", "text/plain")],
        vec![meta("c", "text/plain")],
        vec![],
        vec![meta("d", "text/plain"), meta("e", "text/plain")],
    ];
    let store = ScriptedStore::new(pages);

    let listed = BucketLister::new(&store, ListOptions::default())
        .list_all()
        .await
        .unwrap();

    assert_eq!(keys(&listed), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(
        *store.list_calls.lock().unwrap(),
        vec![
            None,
            Some("t1".to_string()),
            Some("t2".to_string()),
            Some("t3".to_string())
        ]
    );
}

#[tokio::test]
async fn test_list_all_terminates_for_many_pages() {
    for page_count in [1usize, 2, 17, 250] {
        let pages: Vec<Vec<ObjectMeta>> = (0..page_count)
            .map(|i| vec![meta(&format!("obj-{:04}", i), "text/plain")])
            .collect();
        let store = ScriptedStore::new(pages);

        let listed = BucketLister::new(&store, ListOptions::default())
            .list_all()
            .await
            .unwrap();

        assert_eq!(listed.len(), page_count);
        assert_eq!(store.list_calls.lock().unwrap().len(), page_count);
    }
}

#[tokio::test]
async fn test_list_all_propagates_page_failure() {
    let pages = vec![
        vec![meta("a", "text/plain")],
        vec![meta("b", "text/plain")],
        vec![meta("c", "text/plain")],
    ];
    let store = ScriptedStore::new(pages).failing_on(1);

    let result = BucketLister::new(&store, ListOptions::default())
        .list_all()
        .await;

    assert!(matches!(result, Err(ObjectStoreError::Network(_))));
    assert_eq!(store.list_calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_driver_resizes_only_eligible_object() {
    let pages = vec![
        vec![
            meta("leyKart-images/B1/G0.png", "image/png"),
            meta(TARGET, "image/jpeg"),
        ],
        vec![
            meta(TARGET, "image/png"),
            meta("leyKart-images/B1/G1.png.txt", "image/png"),
            meta("notes.txt", "text/plain"),
        ],
    ];
    let store = Arc::new(ScriptedStore::new(pages).with_object(TARGET, png_bytes(320, 240)));

    let driver = Driver::new(
        store.clone(),
        Arc::new(JpegResizer::default()),
        authenticated_config(),
    );
    let mut out = Vec::new();
    let report = driver.run_with_output(&mut out).await.unwrap();

    assert_eq!(report.objects_listed, 5);
    assert_eq!(report.transformed, vec![format!("resizedImage_100X50{}", TARGET)]);
    assert_eq!(
        store.put_keys(),
        vec![
            "resizedImage_100X50leyKart-images/B1/G1.png".to_string(),
            "json-test.txt".to_string()
        ]
    );

    let puts = store.puts.lock().unwrap();
    let (_, content_type, data) = &puts[0];
    assert_eq!(content_type.as_deref(), Some("image/jpeg"));
    let resized = image::load_from_memory(data).unwrap();
    assert_eq!((resized.width(), resized.height()), (100, 50));
    assert_eq!(image::guess_format(data).unwrap(), ImageFormat::Jpeg);

    let (_, content_type, data) = &puts[1];
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(data, &Bytes::from_static(b"Sample file"));

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("name: scripted-bucket\n"));
    assert!(out.contains("owner: project-owners-123\n"));
    assert!(out.contains("notes.txt (42 bytes)\n"));
}

#[tokio::test]
async fn test_driver_without_content_type_check() {
    let pages = vec![vec![meta(TARGET, "application/octet-stream")]];
    let store = Arc::new(ScriptedStore::new(pages).with_object(TARGET, png_bytes(64, 64)));

    let mut config = authenticated_config();
    config.required_content_type = None;
    config.resize.width = 125;
    config.resize.height = 75;
    config.derived_prefix = "resizedImage_125X75".to_string();
    config.test_upload.enabled = false;

    let driver = Driver::new(store.clone(), Arc::new(JpegResizer::default()), config);
    let report = driver.run_with_output(&mut Vec::new()).await.unwrap();

    assert_eq!(report.transformed, vec![format!("resizedImage_125X75{}", TARGET)]);
    let puts = store.puts.lock().unwrap();
    let resized = image::load_from_memory(&puts[0].2).unwrap();
    assert_eq!((resized.width(), resized.height()), (125, 75));
}

#[tokio::test]
async fn test_driver_list_failure_skips_all_uploads() {
    let pages = vec![
        vec![meta("a.txt", "text/plain")],
        vec![meta("b.txt", "text/plain")],
        vec![meta(TARGET, "image/png")],
    ];
    let store = Arc::new(
        ScriptedStore::new(pages)
            .failing_on(1)
            .with_object(TARGET, png_bytes(32, 32)),
    );

    let driver = Driver::new(
        store.clone(),
        Arc::new(JpegResizer::default()),
        authenticated_config(),
    );
    let result = driver.run_with_output(&mut Vec::new()).await;

    match result {
        Err(err @ PipelineError::Storage(ObjectStoreError::Network(_))) => {
            assert!(err.is_io_class());
        }
        other => panic!("expected storage failure, got {:?}", other),
    }
    assert!(store.put_keys().is_empty());
}

#[tokio::test]
async fn test_driver_decode_failure_aborts_run() {
    let pages = vec![vec![meta(TARGET, "image/png"), meta("z.txt", "text/plain")]];
    let store = Arc::new(
        ScriptedStore::new(pages).with_object(TARGET, Bytes::from_static(b"not a png")),
    );

    let driver = Driver::new(
        store.clone(),
        Arc::new(JpegResizer::default()),
        authenticated_config(),
    );
    let result = driver.run_with_output(&mut Vec::new()).await;

    match result {
        Err(err @ PipelineError::Transform(_)) => assert!(!err.is_io_class()),
        other => panic!("expected transform failure, got {:?}", other),
    }
    // neither the derived object nor the test object was written
    assert!(store.put_keys().is_empty());
}

#[tokio::test]
async fn test_driver_fetches_from_public_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/scripted-bucket/leyKart-images/B1/G1.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_bytes(200, 100).to_vec())
        .create_async()
        .await;

    let pages = vec![vec![meta(TARGET, "image/png")]];
    // nothing stored: an authenticated read would fail
    let store = Arc::new(ScriptedStore::new(pages));

    let mut config = PipelineConfig::default();
    config.image_source = ImageSourceConfig::PublicUrl {
        base_url: server.url(),
    };
    config.test_upload.enabled = false;

    let driver = Driver::new(store.clone(), Arc::new(JpegResizer::default()), config);
    let report = driver.run_with_output(&mut Vec::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(report.transformed.len(), 1);
    assert_eq!(
        store.put_keys(),
        vec!["resizedImage_100X50leyKart-images/B1/G1.png".to_string()]
    );
}

#[tokio::test]
async fn test_driver_applies_upload_acl() {
    let pages = vec![vec![meta(TARGET, "image/png")]];
    let store = Arc::new(ScriptedStore::new(pages).with_object(TARGET, png_bytes(40, 20)));

    let mut config = authenticated_config();
    config.upload_acl = Some("publicRead".to_string());

    let driver = Driver::new(store.clone(), Arc::new(JpegResizer::default()), config);
    driver.run_with_output(&mut Vec::new()).await.unwrap();

    assert_eq!(
        *store.acls.lock().unwrap(),
        vec![
            (
                "resizedImage_100X50leyKart-images/B1/G1.png".to_string(),
                Some("publicRead".to_string())
            ),
            ("json-test.txt".to_string(), Some("publicRead".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_driver_leaves_acl_unset_by_default() {
    let pages = vec![vec![meta(TARGET, "image/png")]];
    let store = Arc::new(ScriptedStore::new(pages).with_object(TARGET, png_bytes(40, 20)));

    let driver = Driver::new(
        store.clone(),
        Arc::new(JpegResizer::default()),
        authenticated_config(),
    );
    driver.run_with_output(&mut Vec::new()).await.unwrap();

    let acls = store.acls.lock().unwrap();
    assert_eq!(acls.len(), 2);
    assert!(acls.iter().all(|(_, acl)| acl.is_none()));
}
