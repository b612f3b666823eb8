use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::{CsvTable, Row};

pub const VENDOR_HEADER: &[&str] = &["vendor", "weight"];

/// Weight applied when a create payload omits it.
pub const DEFAULT_WEIGHT: i64 = 100;

/// A tracked restaurant/food source with a selection weight. `id` is the
/// position in the current filtered read, recomputed on every read; it is
/// never persisted and must not be treated as a stable key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vendor {
    pub id: usize,
    pub vendor: String,
    pub weight: i64,
}

/// Create/update payload. `weight` keeps the raw JSON value so numeric
/// strings and whole floats coerce the same way the UI has always relied on.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VendorInput {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub weight: Option<Value>,
}

/// 商家表：`vendor,weight` 两列，整表读写。
#[derive(Clone)]
pub struct VendorStore {
    table: Arc<CsvTable>,
}

impl VendorStore {
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let table = CsvTable::new(path, VENDOR_HEADER).await?;
        Ok(Arc::new(Self { table }))
    }

    /// 读取全部商家；名称为空的行被跳过，权重解析失败按 0 处理。
    pub async fn list(&self) -> Result<Vec<Vendor>, ServiceError> {
        Ok(Self::from_rows(self.table.read().await?))
    }

    /// Append a vendor after validating name, weight, and uniqueness.
    pub async fn create(&self, input: VendorInput) -> Result<(), ServiceError> {
        let name = trimmed(&input.vendor);
        if name.is_empty() {
            return Err(ServiceError::Validation("商家名称不能为空".into()));
        }
        let weight = match &input.weight {
            None => DEFAULT_WEIGHT,
            Some(raw) => coerce_weight(raw)?,
        };

        let appended = name.clone();
        self.table
            .update(move |rows| {
                let vendors = Self::from_rows(rows);
                if vendors.iter().any(|v| v.vendor == name) {
                    return Err(ServiceError::Duplicate("该商家已存在".into()));
                }
                let mut out: Vec<Vec<String>> = vendors.iter().map(Self::to_row).collect();
                out.push(vec![name, weight.to_string()]);
                Ok(out)
            })
            .await?;
        info!(vendor = %appended, weight, "vendor created");
        Ok(())
    }

    /// Partial update by position. An empty (post-trim) name means "leave
    /// the name unchanged"; the duplicate scan skips the row being renamed.
    pub async fn update(&self, index: usize, input: VendorInput) -> Result<(), ServiceError> {
        let new_name = trimmed(&input.vendor);
        self.table
            .update(move |rows| {
                let mut vendors = Self::from_rows(rows);
                if index >= vendors.len() {
                    return Err(ServiceError::invalid_index());
                }
                if !new_name.is_empty()
                    && vendors
                        .iter()
                        .enumerate()
                        .any(|(i, v)| v.vendor == new_name && i != index)
                {
                    return Err(ServiceError::Duplicate("该商家名称已存在".into()));
                }
                let weight = match &input.weight {
                    None => vendors[index].weight,
                    Some(raw) => coerce_weight(raw)?,
                };
                if !new_name.is_empty() {
                    vendors[index].vendor = new_name;
                }
                vendors[index].weight = weight;
                Ok(vendors.iter().map(Self::to_row).collect())
            })
            .await?;
        info!(index, "vendor updated");
        Ok(())
    }

    /// Remove by position; all later positions shift down by one.
    pub async fn delete(&self, index: usize) -> Result<(), ServiceError> {
        self.table
            .update(move |rows| {
                let mut vendors = Self::from_rows(rows);
                if index >= vendors.len() {
                    return Err(ServiceError::invalid_index());
                }
                vendors.remove(index);
                Ok(vendors.iter().map(Self::to_row).collect())
            })
            .await?;
        info!(index, "vendor deleted");
        Ok(())
    }

    fn from_rows(rows: Vec<Row>) -> Vec<Vendor> {
        let mut vendors = Vec::new();
        for row in &rows {
            let name = row.get("vendor").map(|s| s.trim()).unwrap_or("");
            if name.is_empty() {
                continue;
            }
            let weight = row
                .get("weight")
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(0);
            vendors.push(Vendor {
                id: vendors.len(),
                vendor: name.to_string(),
                weight,
            });
        }
        vendors
    }

    fn to_row(v: &Vendor) -> Vec<String> {
        vec![v.vendor.clone(), v.weight.to_string()]
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}

/// Coerce a JSON weight to an integer: integers pass through, floats
/// truncate, numeric-integer strings parse. Anything else is rejected, as
/// is a negative result.
fn coerce_weight(raw: &Value) -> Result<i64, ServiceError> {
    let weight = match raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => n.as_i64(),
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ServiceError::Validation("权重必须是数字".into()))?;
    if weight < 0 {
        return Err(ServiceError::Validation("权重必须大于等于0".into()));
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    async fn setup_store() -> Arc<VendorStore> {
        let tmp = std::env::temp_dir().join(format!("vendors_{}.csv", Uuid::new_v4()));
        VendorStore::new(&tmp).await.expect("store init")
    }

    fn input(name: &str, weight: Option<Value>) -> VendorInput {
        VendorInput {
            vendor: Some(name.to_string()),
            weight,
        }
    }

    #[tokio::test]
    async fn create_appends_with_default_weight() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        store.create(input("面馆", None)).await?;
        store.create(input("Pizza Place", Some(json!(80)))).await?;

        let vendors = store.list().await?;
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].vendor, "面馆");
        assert_eq!(vendors[0].weight, DEFAULT_WEIGHT);
        assert_eq!(vendors[1].weight, 80);
        // ids are dense and positional
        assert_eq!(vendors[0].id, 0);
        assert_eq!(vendors[1].id, 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_bad_input() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        let err = store.create(input("   ", None)).await.unwrap_err();
        assert_eq!(err.to_string(), "商家名称不能为空");

        let err = store
            .create(input("A", Some(json!("not-a-number"))))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "权重必须是数字");

        let err = store.create(input("A", Some(json!(-5)))).await.unwrap_err();
        assert_eq!(err.to_string(), "权重必须大于等于0");

        // nothing was written
        assert!(store.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn create_accepts_coercible_weights() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        store.create(input("A", Some(json!("80")))).await?;
        store.create(input("B", Some(json!(80.9)))).await?;
        let vendors = store.list().await?;
        assert_eq!(vendors[0].weight, 80);
        assert_eq!(vendors[1].weight, 80);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_rejected_regardless_of_weight() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        store.create(input("ABC", Some(json!(80)))).await?;
        let err = store
            .create(input("ABC", Some(json!(10))))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
        assert_eq!(err.to_string(), "该商家已存在");
        assert_eq!(store.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_is_partial_and_skips_self_in_duplicate_scan() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        store.create(input("A", Some(json!(10)))).await?;
        store.create(input("B", Some(json!(20)))).await?;

        // renaming B to A collides
        let err = store.update(1, input("A", None)).await.unwrap_err();
        assert_eq!(err.to_string(), "该商家名称已存在");

        // re-submitting a vendor's own name is not a collision
        store.update(0, input("A", Some(json!(15)))).await?;
        let vendors = store.list().await?;
        assert_eq!(vendors[0].vendor, "A");
        assert_eq!(vendors[0].weight, 15);

        // empty name leaves the name unchanged
        store.update(1, input("", Some(json!(25)))).await?;
        let vendors = store.list().await?;
        assert_eq!(vendors[1].vendor, "B");
        assert_eq!(vendors[1].weight, 25);

        // omitted weight leaves the weight unchanged
        store
            .update(
                1,
                VendorInput {
                    vendor: Some("C".into()),
                    weight: None,
                },
            )
            .await?;
        let vendors = store.list().await?;
        assert_eq!(vendors[1].vendor, "C");
        assert_eq!(vendors[1].weight, 25);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_out_of_bounds() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        store.create(input("A", None)).await?;

        let err = store.update(3, input("B", None)).await.unwrap_err();
        assert_eq!(err.to_string(), "无效的索引");
        let err = store.delete(3).await.unwrap_err();
        assert_eq!(err.to_string(), "无效的索引");
        Ok(())
    }

    #[tokio::test]
    async fn delete_shifts_later_positions() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        for name in ["A", "B", "C"] {
            store.create(input(name, None)).await?;
        }
        store.delete(1).await?;
        let vendors = store.list().await?;
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].vendor, "A");
        assert_eq!(vendors[1].vendor, "C");
        assert_eq!(vendors[1].id, 1);
        Ok(())
    }

    #[tokio::test]
    async fn read_skips_blank_names_and_defaults_bad_weights() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("vendors_{}.csv", Uuid::new_v4()));
        tokio::fs::write(&tmp, "vendor,weight\nA,80\n,50\nB,oops\n").await?;
        let store = VendorStore::new(&tmp).await?;

        let vendors = store.list().await?;
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].vendor, "A");
        assert_eq!(vendors[0].weight, 80);
        assert_eq!(vendors[1].vendor, "B");
        assert_eq!(vendors[1].weight, 0);
        // ids are dense over the filtered list
        assert_eq!(vendors[1].id, 1);
        Ok(())
    }
}
