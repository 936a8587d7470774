// ==========================================
// 集成测试辅助工具
// ==========================================
// 各测试二进制只用到其中一部分
#![allow(dead_code)]

pub mod api_test_helper;
pub mod test_data_builder;
