use axum::Json;
use serde::Serialize;

/// Every tool exposed under `POST /tools/{name}`.
pub const TOOLS: &[(&str, &str)] = &[
    (
        "search_companies",
        "Search the companies register by name or number. Requires `q`.",
    ),
    (
        "advanced_search_companies",
        "Filtered company search by name fragments, status, type, SIC code, location and dates.",
    ),
    ("search_officers", "Search company officers by name. Requires `q`."),
    (
        "get_interests",
        "Published Commons register of members' financial interests.",
    ),
    (
        "get_lords_interests",
        "Register of interests for members of the House of Lords.",
    ),
    ("get_lords_staff", "Staff registered by members of the House of Lords."),
    ("get_members", "Search current and former members of both Houses."),
    ("get_categories", "Categories of the register of interests."),
    (
        "get_member_contribution_summary",
        "Debates a member spoke in. Queues every listed debate for indexing.",
    ),
    (
        "get_debate",
        "Full Hansard debate tree by external id. Indexes its speeches before returning.",
    ),
    (
        "search_debates",
        "Similarity search over indexed speeches with optional metadata and content filters.",
    ),
];

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
}

/// GET /tools - Tool catalogue
pub async fn tools_handler() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: TOOLS
            .iter()
            .map(|&(name, description)| ToolInfo { name, description })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_are_unique() {
        let names: HashSet<_> = TOOLS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), TOOLS.len());
        assert_eq!(TOOLS.len(), 11);
    }
}
