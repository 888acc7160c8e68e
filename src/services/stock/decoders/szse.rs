//! 深交所交易日历

use chrono::Datelike;
use serde::Deserialize;

use crate::models::TradeCalendar;
use crate::services::stock::common::{lossy_i64, lossy_string, parse_trade_date};

#[derive(Debug, Default, Deserialize)]
pub struct MonthListResponse {
    #[serde(default)]
    pub data: Vec<MonthDay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonthDay {
    /// 日期
    #[serde(deserialize_with = "lossy_string")]
    pub jyrq: String,
    /// 1 交易日，0 休市
    #[serde(deserialize_with = "lossy_i64")]
    pub jybz: i64,
}

/// 一个月的交易日历，日期无法识别的记录跳过
pub fn decode_month(resp: MonthListResponse) -> Vec<TradeCalendar> {
    resp.data
        .into_iter()
        .filter_map(|day| {
            let date = parse_trade_date(&day.jyrq)?;
            Some(TradeCalendar {
                trade_date: date.format("%Y-%m-%d").to_string(),
                trade_status: i32::from(day.jybz == 1),
                day_week: date.weekday().number_from_monday() as i32,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_month() {
        let resp: MonthListResponse = serde_json::from_str(
            r#"{"nowdate":"2024-01-02","data":[
                {"zrxh":2,"jybz":"0","jyrq":"2024-01-01"},
                {"zrxh":3,"jybz":"1","jyrq":"2024-01-02"},
                {"zrxh":1,"jybz":"0","jyrq":"2024-01-07"},
                {"zrxh":1,"jybz":"0","jyrq":""}
            ]}"#,
        )
        .unwrap();
        let days = decode_month(resp);
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].trade_status, 1);
        assert_eq!(days[1].day_week, 2);
        assert_eq!(days[2].trade_status, 0);
        assert_eq!(days[2].day_week, 7);
    }
}
