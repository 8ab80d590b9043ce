/// Today's UTC date in `YYYY-MM-DD` form (default payment date in forms).
pub fn today_iso() -> String {
    chrono::Utc::now().date_naive().to_string()
}
