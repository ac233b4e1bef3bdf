fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use assetmgr_protocol::{
        AbortUploadRequest, AssetKind, CompleteUploadRequest, CreateUploadRequest,
        CreateUploadResponse, OrganizationsResponse, PartResult, ProjectsResponse,
    };
    use assetmgr_upload::{BatchResult, BatchStatus};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent). Returns the parsed value.
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    // --- Upload protocol ---

    #[test]
    fn fixture_create_upload_request() {
        let req: CreateUploadRequest = roundtrip_test("create_upload_request.json");
        assert_eq!(req.kind, AssetKind::Image);
        assert_eq!(req.file_size, 2_483_910);
        assert_eq!(req.metadata.unwrap()["seed"], 123_456_789);
    }

    #[test]
    fn fixture_create_upload_request_minimal() {
        let req: CreateUploadRequest = roundtrip_test("create_upload_request_minimal.json");
        assert_eq!(req.kind, AssetKind::Model3d);
        assert!(req.organization_id.is_none());
        assert!(req.metadata.is_none());
        assert_eq!(req.folder_id, req.project_id);
    }

    #[test]
    fn fixture_create_upload_response() {
        let resp: CreateUploadResponse = roundtrip_test("create_upload_response.json");
        assert_eq!(resp.upload_id, "2~xkQ9rT0vYb");
    }

    #[test]
    fn fixture_part_result() {
        let part: PartResult = roundtrip_test("part_result.json");
        assert_eq!(part.part_number, 3);
        assert!(part.etag.starts_with('"'));
    }

    #[test]
    fn fixture_complete_upload_request() {
        let req: CompleteUploadRequest = roundtrip_test("complete_upload_request.json");
        let numbers: Vec<u32> = req.parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(req.kind, AssetKind::Video);
        assert_eq!(req.metadata, serde_json::json!({}));
    }

    #[test]
    fn fixture_abort_upload_request() {
        roundtrip_test::<AbortUploadRequest>("abort_upload_request.json");
    }

    // --- Metadata reads ---

    #[test]
    fn fixture_organizations_response() {
        let resp: OrganizationsResponse = roundtrip_test("organizations_response.json");
        assert_eq!(resp.organizations.len(), 2);
        assert_eq!(resp.organizations[1].extra["plan"]["tier"], "free");
    }

    #[test]
    fn fixture_projects_response() {
        let resp: ProjectsResponse = roundtrip_test("projects_response.json");
        assert_eq!(resp.folders[0].name, "Campaign");
        assert!(resp.folders[0].extra["parentId"].is_null());
    }

    // --- Local HTTP surface ---

    #[test]
    fn fixture_batch_result_partial() {
        let mut result = BatchResult::new(3);
        result.record_success();
        result.record_failure("sub/missing.png", "File not found");
        result.record_success();
        result.finalize();
        assert_eq!(result.status, BatchStatus::Partial);

        let fixture = load_fixture("batch_result_partial.json");
        assert_eq!(serde_json::to_value(&result).unwrap(), fixture);
    }
}
