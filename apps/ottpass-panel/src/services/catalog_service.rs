use ottpass_db::models::plan::PlanType;
use serde::Serialize;

/// A purchasable bundle as shown in the bot's store menu.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOffer {
    pub code: String,
    pub name: String,
    /// Price in paise.
    pub price: i64,
    pub platforms: Vec<String>,
    pub duration_days: i64,
}

#[derive(Debug, Clone)]
pub struct CatalogService;

impl CatalogService {
    pub fn list(&self) -> Vec<PlanOffer> {
        vec![
            PlanOffer {
                code: "weekly".to_string(),
                name: "Weekly Plan".to_string(),
                price: 9900,
                platforms: vec![
                    "Netflix".to_string(),
                    "Prime Video".to_string(),
                    "Hotstar".to_string(),
                ],
                duration_days: PlanType::Weekly.duration_days(),
            },
            PlanOffer {
                code: "monthly".to_string(),
                name: "Monthly Plan".to_string(),
                price: 29900,
                platforms: vec![
                    "Netflix".to_string(),
                    "Prime Video".to_string(),
                    "Hotstar".to_string(),
                    "Zee5".to_string(),
                    "SonyLIV".to_string(),
                ],
                duration_days: PlanType::Monthly.duration_days(),
            },
        ]
    }

    pub fn get(&self, code: &str) -> Option<PlanOffer> {
        self.list().into_iter().find(|p| p.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plan_codes_resolve_to_nothing() {
        let catalog = CatalogService;
        assert!(catalog.get("weekly").is_some());
        assert!(catalog.get("monthly").is_some());
        assert!(catalog.get("lifetime").is_none());
    }

    #[test]
    fn offer_durations_match_their_cadence() {
        let catalog = CatalogService;
        assert_eq!(catalog.get("weekly").unwrap().duration_days, 7);
        assert_eq!(catalog.get("monthly").unwrap().duration_days, 30);
    }
}
