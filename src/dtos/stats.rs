use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub user_total: i64,
    pub booking_total: i64,
    pub delivered_total: i64,
}
