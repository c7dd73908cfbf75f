//! 产品表单控制器
//!
//! 四个相互独立的文本缓冲区，提交时校验必填并把价格、年份解析成数字。

use super::model::{Product, ProductData, ProductPayload};
use crate::core::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    name: String,
    features: String,
    price: String,
    year: String,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用已有产品预填表单（编辑对话框使用）
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            features: product.data.features.clone(),
            price: format_number(product.data.price),
            year: product.data.year.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &str {
        &self.features
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    pub fn set_features(&mut self, value: impl Into<String>) {
        self.features = value.into();
    }

    pub fn set_price(&mut self, value: impl Into<String>) {
        self.price = value.into();
    }

    pub fn set_year(&mut self, value: impl Into<String>) {
        self.year = value.into();
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 构造请求体；任何字段为空或数字无法解析都会失败，表单内容保持不变
    pub fn to_payload(&self) -> Result<ProductPayload, CoreError> {
        let name = required("name", &self.name)?;
        let features = required("features", &self.features)?;
        let price_text = required("price", &self.price)?;
        let year_text = required("year", &self.year)?;

        let price = price_text
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| CoreError::InvalidNumber {
                field: "price",
                value: price_text.to_string(),
            })?;
        let year = year_text
            .parse::<i32>()
            .map_err(|_| CoreError::InvalidNumber {
                field: "year",
                value: year_text.to_string(),
            })?;

        Ok(ProductPayload {
            name: name.to_string(),
            data: ProductData {
                features: features.to_string(),
                price,
                year,
            },
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CoreError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// 整数价格不带小数点显示
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
