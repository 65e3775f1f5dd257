//! Result Summary
//!
//! SUCCESS 메타데이터 해석. RUN 의 SUCCESS 는 키와 대기 시간을,
//! PULL_ALL / DISCARD_ALL 의 SUCCESS 는 나머지 요약 정보를 담습니다.

use std::collections::HashMap;
use std::time::Duration;

use super::error::{DriverError, DriverResult};
use super::types::Value;

type Metadata = HashMap<String, Value>;

fn get_str<'a>(map: &'a Metadata, key: &str) -> DriverResult<Option<&'a str>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(DriverError::protocol(format!(
            "Expected `{}` to be a string, got {}",
            key,
            other.type_name()
        ))),
    }
}

fn get_int(map: &Metadata, key: &str) -> DriverResult<Option<i64>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(i)) => Ok(Some(*i)),
        Some(other) => Err(DriverError::protocol(format!(
            "Expected `{}` to be an integer, got {}",
            key,
            other.type_name()
        ))),
    }
}

fn get_millis(map: &Metadata, key: &str) -> DriverResult<Option<Duration>> {
    Ok(get_int(map, key)?.map(|ms| Duration::from_millis(ms.max(0) as u64)))
}

fn expect_map<'a>(value: &'a Value, what: &str) -> DriverResult<&'a Metadata> {
    value.as_map().ok_or_else(|| {
        DriverError::protocol(format!("Expected {} to be a map, got {}", what, value.type_name()))
    })
}

fn expect_list<'a>(map: &'a Metadata, key: &str) -> DriverResult<&'a [Value]> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::List(l)) => Ok(l.as_slice()),
        Some(other) => Err(DriverError::protocol(format!(
            "Expected `{}` to be a list, got {}",
            key,
            other.type_name()
        ))),
    }
}

// ============================================================================
// StatementType - 구문 종류
// ============================================================================

/// 구문 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    /// 읽기 전용 (`r`)
    ReadOnly,
    /// 읽기/쓰기 (`rw`)
    ReadWrite,
    /// 쓰기 전용 (`w`)
    WriteOnly,
    /// 스키마 변경 (`s`)
    SchemaWrite,
}

impl StatementType {
    /// 서버 코드에서 변환
    pub fn from_code(code: &str) -> DriverResult<Self> {
        match code {
            "r" => Ok(StatementType::ReadOnly),
            "rw" => Ok(StatementType::ReadWrite),
            "w" => Ok(StatementType::WriteOnly),
            "s" => Ok(StatementType::SchemaWrite),
            other => Err(DriverError::protocol(format!(
                "Unknown statement type: `{}`",
                other
            ))),
        }
    }

    /// 서버 코드
    pub fn code(self) -> &'static str {
        match self {
            StatementType::ReadOnly => "r",
            StatementType::ReadWrite => "rw",
            StatementType::WriteOnly => "w",
            StatementType::SchemaWrite => "s",
        }
    }
}

// ============================================================================
// SummaryCounters - 변경 카운터
// ============================================================================

/// 변경 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounters {
    /// 생성된 노드 수
    pub nodes_created: i64,
    /// 삭제된 노드 수
    pub nodes_deleted: i64,
    /// 생성된 관계 수
    pub relationships_created: i64,
    /// 삭제된 관계 수
    pub relationships_deleted: i64,
    /// 설정된 속성 수
    pub properties_set: i64,
    /// 추가된 레이블 수
    pub labels_added: i64,
    /// 제거된 레이블 수
    pub labels_removed: i64,
    /// 생성된 인덱스 수
    pub indexes_added: i64,
    /// 제거된 인덱스 수
    pub indexes_removed: i64,
    /// 추가된 제약조건 수
    pub constraints_added: i64,
    /// 제거된 제약조건 수
    pub constraints_removed: i64,
}

impl SummaryCounters {
    /// `stats` 맵에서 변환. 없는 키는 0 입니다.
    pub fn from_value(value: &Value) -> DriverResult<Self> {
        let stats = expect_map(value, "stats")?;
        let count = |key: &str| get_int(stats, key).map(|v| v.unwrap_or(0));
        Ok(Self {
            nodes_created: count("nodes-created")?,
            nodes_deleted: count("nodes-deleted")?,
            relationships_created: count("relationships-created")?,
            relationships_deleted: count("relationships-deleted")?,
            properties_set: count("properties-set")?,
            labels_added: count("labels-added")?,
            labels_removed: count("labels-removed")?,
            indexes_added: count("indexes-added")?,
            indexes_removed: count("indexes-removed")?,
            constraints_added: count("constraints-added")?,
            constraints_removed: count("constraints-removed")?,
        })
    }

    /// 변경 사항 존재 여부
    pub fn contains_updates(&self) -> bool {
        self.nodes_created > 0
            || self.nodes_deleted > 0
            || self.relationships_created > 0
            || self.relationships_deleted > 0
            || self.properties_set > 0
            || self.labels_added > 0
            || self.labels_removed > 0
            || self.contains_system_updates()
    }

    /// 스키마 변경 존재 여부
    pub fn contains_system_updates(&self) -> bool {
        self.indexes_added > 0
            || self.indexes_removed > 0
            || self.constraints_added > 0
            || self.constraints_removed > 0
    }
}

// ============================================================================
// Plan / ProfiledPlan - 실행 계획
// ============================================================================

/// 실행 계획 (EXPLAIN)
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// 연산자 종류
    pub operator_type: String,
    /// 연산자 인자
    pub arguments: HashMap<String, Value>,
    /// 식별자
    pub identifiers: Vec<String>,
    /// 하위 계획
    pub children: Vec<Plan>,
}

fn plan_parts(value: &Value) -> DriverResult<(&Metadata, String, HashMap<String, Value>, Vec<String>)> {
    let map = expect_map(value, "plan")?;
    let operator_type = get_str(map, "operatorType")?
        .ok_or_else(|| DriverError::protocol("Plan is missing `operatorType`"))?
        .to_string();
    let arguments = match map.get("args") {
        None | Some(Value::Null) => HashMap::new(),
        Some(args) => expect_map(args, "plan args")?.clone(),
    };
    let identifiers = expect_list(map, "identifiers")?
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                DriverError::protocol(format!("Plan identifier must be a string, got {}", v.type_name()))
            })
        })
        .collect::<DriverResult<Vec<_>>>()?;
    Ok((map, operator_type, arguments, identifiers))
}

impl Plan {
    /// 계획 맵에서 변환
    pub fn from_value(value: &Value) -> DriverResult<Self> {
        let (map, operator_type, arguments, identifiers) = plan_parts(value)?;
        let children = expect_list(map, "children")?
            .iter()
            .map(Plan::from_value)
            .collect::<DriverResult<Vec<_>>>()?;
        Ok(Self {
            operator_type,
            arguments,
            identifiers,
            children,
        })
    }
}

/// 프로파일된 실행 계획 (PROFILE)
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledPlan {
    /// 연산자 종류
    pub operator_type: String,
    /// 연산자 인자
    pub arguments: HashMap<String, Value>,
    /// 식별자
    pub identifiers: Vec<String>,
    /// DB 접근 수
    pub db_hits: i64,
    /// 생성된 행 수
    pub records: i64,
    /// 하위 계획
    pub children: Vec<ProfiledPlan>,
}

impl ProfiledPlan {
    /// 프로파일 맵에서 변환
    pub fn from_value(value: &Value) -> DriverResult<Self> {
        let (map, operator_type, arguments, identifiers) = plan_parts(value)?;
        let children = expect_list(map, "children")?
            .iter()
            .map(ProfiledPlan::from_value)
            .collect::<DriverResult<Vec<_>>>()?;
        Ok(Self {
            operator_type,
            arguments,
            identifiers,
            db_hits: get_int(map, "dbHits")?.unwrap_or(0),
            records: get_int(map, "rows")?.unwrap_or(0),
            children,
        })
    }
}

// ============================================================================
// Notification - 알림
// ============================================================================

/// 입력 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPosition {
    /// 오프셋
    pub offset: i64,
    /// 라인
    pub line: i64,
    /// 컬럼
    pub column: i64,
}

/// 알림
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// 코드
    pub code: String,
    /// 제목
    pub title: String,
    /// 설명
    pub description: String,
    /// 심각도
    pub severity: Option<String>,
    /// 위치
    pub position: Option<InputPosition>,
}

impl Notification {
    /// 알림 맵에서 변환
    pub fn from_value(value: &Value) -> DriverResult<Self> {
        let map = expect_map(value, "notification")?;
        let text = |key: &str| get_str(map, key).map(|s| s.unwrap_or_default().to_string());
        let position = match map.get("position") {
            None | Some(Value::Null) => None,
            Some(pos) => {
                let pos = expect_map(pos, "notification position")?;
                Some(InputPosition {
                    offset: get_int(pos, "offset")?.unwrap_or(0),
                    line: get_int(pos, "line")?.unwrap_or(0),
                    column: get_int(pos, "column")?.unwrap_or(0),
                })
            }
        };
        Ok(Self {
            code: text("code")?,
            title: text("title")?,
            description: text("description")?,
            severity: get_str(map, "severity")?.map(str::to_string),
            position,
        })
    }
}

// ============================================================================
// ResultSummary - 결과 요약
// ============================================================================

/// 결과 요약
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSummary {
    /// 실행한 구문
    pub statement: String,
    /// 구문 종류
    pub statement_type: Option<StatementType>,
    /// 카운터
    pub counters: SummaryCounters,
    /// 실행 계획
    pub plan: Option<Plan>,
    /// 프로파일
    pub profile: Option<ProfiledPlan>,
    /// 알림
    pub notifications: Vec<Notification>,
    /// 결과 대기 시간
    pub result_available_after: Option<Duration>,
    /// 결과 소비 시간
    pub result_consumed_after: Option<Duration>,
}

impl ResultSummary {
    /// 빈 요약 생성
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            ..Default::default()
        }
    }

    /// RUN 의 SUCCESS 메타데이터 반영
    pub fn apply_run_metadata(&mut self, metadata: &Metadata) -> DriverResult<()> {
        if let Some(after) = get_millis(metadata, "result_available_after")? {
            self.result_available_after = Some(after);
        }
        Ok(())
    }

    /// PULL_ALL / DISCARD_ALL 의 SUCCESS 메타데이터 반영
    pub fn apply_stream_metadata(&mut self, metadata: &Metadata) -> DriverResult<()> {
        if let Some(code) = get_str(metadata, "type")? {
            self.statement_type = Some(StatementType::from_code(code)?);
        }
        if let Some(stats) = metadata.get("stats") {
            self.counters = SummaryCounters::from_value(stats)?;
        }
        if let Some(plan) = metadata.get("plan") {
            self.plan = Some(Plan::from_value(plan)?);
        }
        if let Some(profile) = metadata.get("profile") {
            self.profile = Some(ProfiledPlan::from_value(profile)?);
        }
        self.notifications = expect_list(metadata, "notifications")?
            .iter()
            .map(Notification::from_value)
            .collect::<DriverResult<Vec<_>>>()?;
        if let Some(after) = get_millis(metadata, "result_consumed_after")? {
            self.result_consumed_after = Some(after);
        }
        Ok(())
    }

    /// 실행 계획 존재 여부 (PROFILE 포함)
    pub fn has_plan(&self) -> bool {
        self.plan.is_some() || self.profile.is_some()
    }

    /// 프로파일 존재 여부
    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
