// Console configuration
//
// The page contract names every element, class and attribute the controller
// relies on; the endpoints name the server routes it talks to.

/// Stable identifiers the rendering layer must provide
#[derive(Clone, Debug)]
pub struct PageContract {
    pub node_modal_id: String,
    pub node_modal_title_id: String,
    pub node_id_field: String,
    pub node_name_field: String,
    pub node_url_field: String,
    pub node_token_field: String,
    pub current_node_field: String,
    pub stats_view_id: String,
    pub process_table_id: String,
    /// Overlay hosting the log inspector
    pub inspector_container_id: String,
    pub pause_control_id: String,
    pub live_badge_class: String,
    pub hidden_class: String,
    pub trigger_attribute: String,
    pub url_attribute: String,
    pub swap_attribute: String,
    /// Tag of the scrollable log region
    pub scroll_tag: String,
}

impl Default for PageContract {
    fn default() -> Self {
        Self {
            node_modal_id: "node-modal".to_string(),
            node_modal_title_id: "node-modal-title".to_string(),
            node_id_field: "node-id".to_string(),
            node_name_field: "node-name".to_string(),
            node_url_field: "node-url".to_string(),
            node_token_field: "node-token".to_string(),
            current_node_field: "current-node-input".to_string(),
            stats_view_id: "system-stats".to_string(),
            process_table_id: "process-table".to_string(),
            inspector_container_id: "modal-container".to_string(),
            pause_control_id: "pause-btn".to_string(),
            live_badge_class: "animate-pulse".to_string(),
            hidden_class: "hidden".to_string(),
            trigger_attribute: "hx-trigger".to_string(),
            url_attribute: "hx-get".to_string(),
            swap_attribute: "hx-swap".to_string(),
            scroll_tag: "pre".to_string(),
        }
    }
}

/// Server routes consumed by the console
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub stats_view: String,
    pub process_rows: String,
    pub save_node: String,
    /// Prefix; the node id is appended as the last path segment
    pub delete_node: String,
    pub dashboard: String,
    pub node_param: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            stats_view: "/view/stats".to_string(),
            process_rows: "/view/rows".to_string(),
            save_node: "/api/nodes/save".to_string(),
            delete_node: "/api/nodes/delete".to_string(),
            dashboard: "/".to_string(),
            node_param: "node".to_string(),
        }
    }
}

/// Console configuration
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    /// Base URL of the dashboard server, relative paths are joined onto it
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// How often polling directives are evaluated
    pub poll_tick_ms: u64,
    /// Visible lines of a scrollable region in the in-memory page
    pub viewport_lines: u32,
    /// Opaque session cookie forwarded on every request
    pub session_cookie: Option<String>,
    pub contract: PageContract,
    pub endpoints: Endpoints,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7878".to_string(),
            request_timeout_ms: 10_000,
            poll_tick_ms: 250,
            viewport_lines: 20,
            session_cookie: None,
            contract: PageContract::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("SENTINEL_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.base_url),
            request_timeout_ms: std::env::var("SENTINEL_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.request_timeout_ms),
            poll_tick_ms: std::env::var("SENTINEL_POLL_TICK_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.poll_tick_ms),
            viewport_lines: std::env::var("SENTINEL_VIEWPORT_LINES")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.viewport_lines),
            session_cookie: std::env::var("SENTINEL_SESSION_COOKIE")
                .ok()
                .filter(|s| !s.is_empty()),
            contract: defaults.contract,
            endpoints: defaults.endpoints,
        }
    }

    /// Join a server-relative path onto the base URL
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_joins_relative_paths() {
        let config = ConsoleConfig {
            base_url: "http://master:7878/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.absolute_url("/view/stats?node=x"),
            "http://master:7878/view/stats?node=x"
        );
        assert_eq!(config.absolute_url("logs/read"), "http://master:7878/logs/read");
        assert_eq!(
            config.absolute_url("https://edge1.example/api"),
            "https://edge1.example/api"
        );
    }
}
