//! Record - 쿼리 결과 레코드
//!
//! RECORD 메시지 하나를 RUN 의 `fields` 키와 묶은 결과

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::{DriverError, DriverResult};
use super::types::{Node, Path, Relationship, Value};
use crate::bolt::PackStreamValue;

// ============================================================================
// Record - 단일 레코드
// ============================================================================

/// 쿼리 결과 레코드
///
/// 같은 결과 스트림의 레코드는 키 목록을 공유합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    keys: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// 새 레코드 생성
    pub fn new(keys: impl Into<Arc<[String]>>, values: Vec<Value>) -> Self {
        Self {
            keys: keys.into(),
            values,
        }
    }

    /// RECORD 필드에서 생성. 필드 수가 키 수와 다르면 프로토콜 에러입니다.
    pub fn from_fields(keys: Arc<[String]>, fields: Vec<PackStreamValue>) -> DriverResult<Self> {
        if fields.len() != keys.len() {
            return Err(DriverError::protocol(format!(
                "RECORD carries {} field(s) but the result has {} key(s)",
                fields.len(),
                keys.len()
            )));
        }
        let values = fields
            .into_iter()
            .map(Value::try_from)
            .collect::<DriverResult<Vec<_>>>()?;
        Ok(Self { keys, values })
    }

    /// 키 목록
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// 값 목록
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// 레코드 길이
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 빈 레코드 여부
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 키의 위치
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// 키로 값 가져오기
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index_of(key).and_then(|i| self.values.get(i))
    }

    /// 인덱스로 값 가져오기
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// 키 존재 여부
    pub fn contains_key(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// 키로 타입 변환된 값 가져오기
    pub fn get_as<T>(&self, key: &str) -> DriverResult<T>
    where
        T: TryFrom<Value, Error = DriverError>,
    {
        let value = self.get(key).ok_or_else(|| {
            DriverError::type_conversion(format!(
                "Key '{}' not found, available keys: [{}]",
                key,
                self.keys.join(", ")
            ))
        })?;
        T::try_from(value.clone())
    }

    /// Optional 값 가져오기 (Null 은 None)
    pub fn get_optional<T>(&self, key: &str) -> DriverResult<Option<T>>
    where
        T: TryFrom<Value, Error = DriverError>,
    {
        match self.get(key) {
            Some(Value::Null) | None => Ok(None),
            Some(v) => T::try_from(v.clone()).map(Some),
        }
    }

    /// Boolean 값 가져오기
    pub fn get_bool(&self, key: &str) -> DriverResult<bool> {
        self.get_as(key)
    }

    /// Integer 값 가져오기
    pub fn get_int(&self, key: &str) -> DriverResult<i64> {
        self.get_as(key)
    }

    /// Float 값 가져오기
    pub fn get_float(&self, key: &str) -> DriverResult<f64> {
        self.get_as(key)
    }

    /// String 값 가져오기
    pub fn get_string(&self, key: &str) -> DriverResult<String> {
        self.get_as(key)
    }

    /// Node 값 가져오기
    pub fn get_node(&self, key: &str) -> DriverResult<Node> {
        self.get_as(key)
    }

    /// Relationship 값 가져오기
    pub fn get_relationship(&self, key: &str) -> DriverResult<Relationship> {
        self.get_as(key)
    }

    /// Path 값 가져오기
    pub fn get_path(&self, key: &str) -> DriverResult<Path> {
        self.get_as(key)
    }

    /// Map으로 변환
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.keys
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Record<{")?;
        for (i, (k, v)) in self.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}>")
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::iter::Zip<std::slice::Iter<'a, String>, std::slice::Iter<'a, Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter().zip(self.values.iter())
    }
}

// ============================================================================
// Tests
// ============================================================================
