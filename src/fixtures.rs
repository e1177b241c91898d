//! Sample explain responses, as returned by the SQL/PPL explain endpoint.
//!
//! Used by the unit tests here and by the integration tests.

/// An optimizer explain of `source=employees | fields name, age`.
pub const CALCITE_EXPLAIN: &str = r#"{
  "calcite": {
    "logical": "LogicalProject(name=[$0], age=[$1])\n  CalciteLogicalIndexScan(table=[[OpenSearch, employees]])\n",
    "physical": "CalciteEnumerableIndexScan(table=[[OpenSearch, employees]], PushDownContext=[[PROJECT->[name, age]], OpenSearchRequestBuilder(sourceBuilder={\"from\":0,\"size\":200,\"timeout\":\"1m\",\"_source\":{\"includes\":[\"name\",\"age\"],\"excludes\":[]}}, requestedTotalSize=200, pageSize=null, startFrom=0)])\n"
  }
}"#;

/// An optimizer explain of an aggregation that was pushed down.
pub const CALCITE_AGGREGATION_EXPLAIN: &str = r#"{
  "calcite": {
    "logical": "LogicalAggregate(group=[{}], sum(aa)=[SUM($0)])\n  LogicalProject(aa=[$3])\n    CalciteLogicalIndexScan(table=[[OpenSearch, accounts]])\n",
    "physical": "EnumerableLimit(fetch=[10000])\n  CalciteEnumerableIndexScan(table=[[OpenSearch, accounts]], PushDownContext=[[AGGREGATION->rel#:LogicalAggregate.NONE.[](input=RelSubset#1,group={},sum(aa)=SUM($0))], OpenSearchRequestBuilder(sourceBuilder={\"from\":0,\"size\":0,\"timeout\":\"1m\",\"aggregations\":{\"sum(aa)\":{\"sum\":{\"field\":\"balance\"}}}}, requestedTotalSize=10000, pageSize=null, startFrom=0)])\n"
  }
}"#;

/// A legacy explain of `SELECT firstname, age FROM accounts`.
pub const LEGACY_EXPLAIN: &str = r#"{
  "root": {
    "name": "ProjectOperator",
    "description": {
      "fields": "[firstname, age]"
    },
    "children": [
      {
        "name": "OpenSearchIndexScan",
        "description": {
          "request": "OpenSearchQueryRequest(indexName=accounts, sourceBuilder={\"from\":0,\"size\":200,\"timeout\":\"1m\",\"_source\":{\"includes\":[\"firstname\",\"age\"],\"excludes\":[]}}, searchDone=false)"
        },
        "children": []
      }
    ]
  }
}"#;
