use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

async fn expect_json(response: reqwest::Response, expected: StatusCode, step: &str) -> Value {
    let status = response.status();
    if status != expected {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        panic!("{} failed: {} - {}", step, status, error_text);
    }
    response.json().await.expect("Failed to decode response body")
}

#[tokio::test]
#[ignore = "needs a running server; set TEST_API_BASE_URL"]
async fn test_tree_insect_complete_workflow() {
    let base_url = std::env::var("TEST_API_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());

    let client = TestClient::new(base_url);

    println!("Starting tree/insect integration test");

    println!("0. Verifying API server connectivity...");
    let mut retries = 0;
    let max_retries = 30;
    loop {
        match client.get("/health").await {
            Ok(resp) if resp.status().is_success() => {
                println!("API server is ready and responding");
                break;
            }
            _ => {
                if retries >= max_retries {
                    panic!("API server is not responding after {} attempts", max_retries);
                }
                println!("Waiting for API server... (attempt {}/{})", retries + 1, max_retries);
                sleep(Duration::from_secs(2)).await;
                retries += 1;
            }
        }
    }

    // Unique names keep reruns against the same database independent
    let suffix = chrono::Utc::now().timestamp_millis();
    let tree_name = format!("Integration Redwood {}", suffix);
    let insect_name = format!("Integration Beetle {}", suffix);

    println!("1. Creating tree");
    let response = client
        .post(
            "/trees",
            json!({
                "name": tree_name,
                "location": "Test Grove",
                "heightFt": 150.5,
                "groundCircumferenceFt": 40.0
            }),
        )
        .await
        .expect("Failed to create tree");
    let created = expect_json(response, StatusCode::CREATED, "Create tree").await;
    assert_eq!(created["status"], "success");
    let tree_id = created["data"]["id"].as_i64().expect("tree id");

    println!("2. Associating tree {} with a new insect", tree_id);
    let response = client
        .post(
            "/associate-tree-insect",
            json!({
                "tree": {"id": tree_id},
                "insect": {"name": insect_name, "millimeters": 42.0}
            }),
        )
        .await
        .expect("Failed to associate");
    let associated = expect_json(response, StatusCode::OK, "Associate").await;
    assert_eq!(associated["data"]["insects"][0]["name"], insect_name.as_str());
    let insect_id = associated["data"]["insects"][0]["id"]
        .as_i64()
        .expect("insect id");

    println!("3. Repeating the association is rejected");
    let response = client
        .post(
            "/associate-tree-insect",
            json!({"tree": {"id": tree_id}, "insect": {"id": insect_id}}),
        )
        .await
        .expect("Failed to send duplicate association");
    let duplicate = expect_json(response, StatusCode::CONFLICT, "Duplicate association").await;
    assert_eq!(duplicate["status"], "error");

    println!("4. Searching insects by name");
    let response = client
        .get(&format!("/insects/search/{}", suffix))
        .await
        .expect("Failed to search insects");
    let hits = expect_json(response, StatusCode::OK, "Search insects").await;
    let hits = hits.as_array().expect("search results");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["trees"][0]["name"], tree_name.as_str());

    println!("5. Updating tree location");
    let response = client
        .put(
            &format!("/trees/{}", tree_id),
            json!({"id": tree_id, "location": "Updated Grove"}),
        )
        .await
        .expect("Failed to update tree");
    let updated = expect_json(response, StatusCode::OK, "Update tree").await;
    assert_eq!(updated["data"]["location"], "Updated Grove");

    println!("6. Deleting tree");
    let response = client
        .delete(&format!("/trees/{}", tree_id))
        .await
        .expect("Failed to delete tree");
    expect_json(response, StatusCode::OK, "Delete tree").await;

    println!("7. Insect keeps existing without the tree");
    let response = client
        .get(&format!("/insects/{}", insect_id))
        .await
        .expect("Failed to fetch insect");
    let insect = expect_json(response, StatusCode::OK, "Get insect").await;
    assert!(insect["trees"].as_array().expect("trees").is_empty());

    let response = client
        .delete(&format!("/insects/{}", insect_id))
        .await
        .expect("Failed to delete insect");
    expect_json(response, StatusCode::OK, "Delete insect").await;

    println!("Tree/insect workflow completed");
}
