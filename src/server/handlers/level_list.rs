use super::common::*;

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct FilterOptions {
    pub page: Option<u32>,
    pub limit: Option<u32>,

    pub sort_by: Option<SortBy>,
    pub sort_direction: Option<SortDirection>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Id,
    Name,
    Nodes,
    Edges,
    CreatedAt,
    Difficulty,
    SolvedBy,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortBy {
    fn column(self) -> &'static str {
        match self {
            SortBy::Id => "lid",
            SortBy::Name => "name",
            SortBy::Nodes => "nodes",
            SortBy::Edges => "edges",
            SortBy::CreatedAt => "created_at",
            SortBy::Difficulty => "difficulty",
            SortBy::SolvedBy => "solved_by",
        }
    }
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FilterOptions {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> u32 {
        self.limit.unwrap_or(100).clamp(1, 1000)
    }

    fn sort_by(&self) -> SortBy {
        self.sort_by.unwrap_or(SortBy::Id)
    }

    fn sort_direction(&self) -> SortDirection {
        self.sort_direction.unwrap_or(SortDirection::Asc)
    }

    fn defaults_for_missing(self) -> Self {
        Self {
            page: Some(self.page()),
            limit: Some(self.limit()),
            sort_by: Some(self.sort_by()),
            sort_direction: Some(self.sort_direction()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct LevelModel {
    pub lid: i64,
    pub name: String,
    pub created_at: String,
    pub nodes: i64,
    pub edges: i64,
    pub optimal_cost: i64,
    pub difficulty: f32,
    /// Number of distinct players with an optimal solution
    pub solved_by: i64,
}

#[derive(Serialize)]
struct Response {
    status: &'static str,
    options: FilterOptions,
    total_matches: i64,
    results: Vec<LevelModel>,
}

pub async fn level_list_handler(
    opts: Option<Query<FilterOptions>>,
    State(data): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let Query(opts) = opts.unwrap_or_default();
    let opts = opts.defaults_for_missing();

    let (page, limit) = (opts.page(), opts.limit());
    let offset = (page - 1) * limit;

    let total_matches = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM Level"#)
        .fetch_one(data.db())
        .await
        .map_err(sql_to_err_response)?;

    // column and direction come from fixed enums and are never user text
    let query = format!(
        r#"SELECT l.lid, l.name, l.created_at, l.nodes, l.edges, l.optimal_cost, l.difficulty,
            (SELECT COUNT(DISTINCT s.player) FROM Solution s WHERE s.level_lid = l.lid AND s.solved = 1) AS solved_by
           FROM Level l
           ORDER BY {} {}, l.lid ASC
           LIMIT ? OFFSET ?"#,
        opts.sort_by().column(),
        opts.sort_direction().keyword()
    );

    let results = sqlx::query_as::<_, LevelModel>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(data.db())
        .await
        .map_err(sql_to_err_response)?;

    Ok(Json(Response {
        status: "ok",
        options: opts,
        total_matches,
        results,
    }))
}
