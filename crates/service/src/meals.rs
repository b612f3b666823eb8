use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::ServiceError;
use crate::policy::RatePolicy;
use crate::storage::{fmt_float, CsvTable, Row};

pub const MEAL_HEADER: &[&str] = &["date", "order", "price", "rate", "image"];

/// One recorded order. `id` is the position after the date sort, recomputed
/// on every read; it is never persisted.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Meal {
    pub id: usize,
    pub date: String,
    pub order: String,
    pub price: f64,
    pub rate: f64,
    pub image: String,
}

/// Create/update payload. `rate` keeps the raw JSON value because the
/// accepted shapes depend on the active [`RatePolicy`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MealInput {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
}

/// 点餐记录表：`date,order,price,rate,image` 五列，始终按日期倒序返回。
#[derive(Clone)]
pub struct MealStore {
    table: Arc<CsvTable>,
    policy: RatePolicy,
}

impl MealStore {
    pub async fn new<P: Into<PathBuf>>(
        path: P,
        policy: RatePolicy,
    ) -> Result<Arc<Self>, ServiceError> {
        let table = CsvTable::new(path, MEAL_HEADER).await?;
        Ok(Arc::new(Self { table, policy }))
    }

    /// 读取全部点餐记录：按（日期，读取顺序）倒序，最新在前，id 排序后重排。
    pub async fn list(&self) -> Result<Vec<Meal>, ServiceError> {
        Ok(Self::from_rows(self.table.read().await?, self.policy))
    }

    /// Validate and append one meal. The row is appended at the end of the
    /// stored order; its position in subsequent reads is decided by the
    /// date sort, not by append order.
    pub async fn create(&self, input: MealInput) -> Result<(), ServiceError> {
        let date = trimmed(&input.date);
        let order = trimmed(&input.order);
        if date.is_empty() {
            return Err(ServiceError::Validation("日期不能为空".into()));
        }
        if order.is_empty() {
            return Err(ServiceError::Validation("点餐内容不能为空".into()));
        }
        let price = match input.price {
            Some(p) if p >= 0.0 => p,
            _ => return Err(ServiceError::Validation("价格必须大于等于0".into())),
        };
        let rate = self
            .policy
            .validate(input.rate.as_ref().unwrap_or(&Value::Null))?;
        let image = trimmed(&input.image);

        let policy = self.policy;
        let logged = date.clone();
        self.table
            .update(move |rows| {
                let meals = Self::from_rows(rows, policy);
                let mut out: Vec<Vec<String>> =
                    meals.iter().map(|m| Self::to_row(m, policy)).collect();
                out.push(vec![
                    date,
                    order,
                    fmt_float(price),
                    policy.format_stored(rate),
                    image,
                ]);
                Ok(out)
            })
            .await?;
        info!(date = %logged, "meal created");
        Ok(())
    }

    /// Partial update by position in the current sorted read. Empty-string
    /// `date`/`order` mean "unchanged"; supplied `price`/`rate` revalidate
    /// with the same rules as create.
    pub async fn update(&self, index: usize, input: MealInput) -> Result<(), ServiceError> {
        let date = trimmed(&input.date);
        let order = trimmed(&input.order);
        let policy = self.policy;
        self.table
            .update(move |rows| {
                let mut meals = Self::from_rows(rows, policy);
                if index >= meals.len() {
                    return Err(ServiceError::invalid_index());
                }
                let meal = &mut meals[index];
                if !date.is_empty() {
                    meal.date = date;
                }
                if !order.is_empty() {
                    meal.order = order;
                }
                if let Some(price) = input.price {
                    if price < 0.0 {
                        return Err(ServiceError::Validation("价格必须大于等于0".into()));
                    }
                    meal.price = price;
                }
                if let Some(raw) = &input.rate {
                    meal.rate = policy.validate(raw)?;
                }
                if let Some(image) = &input.image {
                    meal.image = image.trim().to_string();
                }
                Ok(meals.iter().map(|m| Self::to_row(m, policy)).collect())
            })
            .await?;
        info!(index, "meal updated");
        Ok(())
    }

    /// Remove by position in the current sorted read.
    pub async fn delete(&self, index: usize) -> Result<(), ServiceError> {
        let policy = self.policy;
        self.table
            .update(move |rows| {
                let mut meals = Self::from_rows(rows, policy);
                if index >= meals.len() {
                    return Err(ServiceError::invalid_index());
                }
                meals.remove(index);
                Ok(meals.iter().map(|m| Self::to_row(m, policy)).collect())
            })
            .await?;
        info!(index, "meal deleted");
        Ok(())
    }

    fn from_rows(rows: Vec<Row>, policy: RatePolicy) -> Vec<Meal> {
        let mut meals: Vec<Meal> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let field = |key: &str| row.get(key).map(String::as_str).unwrap_or("");
                // legacy exports used an `order_text` column
                let order = match field("order") {
                    "" => field("order_text"),
                    o => o,
                };
                let price = field("price").trim();
                Meal {
                    id: idx,
                    date: field("date").trim().to_string(),
                    order: order.trim().to_string(),
                    price: if price.is_empty() {
                        0.0
                    } else {
                        price.parse::<f64>().unwrap_or(0.0)
                    },
                    rate: policy.parse_stored(field("rate")),
                    image: field("image").trim().to_string(),
                }
            })
            .collect();
        // 按（日期，读取顺序）倒序，最新在前；排序稳定由唯一的 pre-sort id 保证
        meals.sort_by(|a, b| (b.date.as_str(), b.id).cmp(&(a.date.as_str(), a.id)));
        for (idx, meal) in meals.iter_mut().enumerate() {
            meal.id = idx;
        }
        meals
    }

    fn to_row(meal: &Meal, policy: RatePolicy) -> Vec<String> {
        vec![
            meal.date.trim().to_string(),
            meal.order.trim().to_string(),
            fmt_float(meal.price),
            policy.format_stored(meal.rate),
            meal.image.trim().to_string(),
        ]
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}
