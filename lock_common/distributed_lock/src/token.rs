/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use mockall::automock;
use uuid::Uuid;

/// Source of ownership tokens.
///
/// Every call must return a value never handed out before, by any process.
#[automock]
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random (v4) UUID tokens, 122 bits of entropy each
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use super::*;

    #[test]
    fn test_uuid_tokens_are_unique() {
        let generator = UuidTokenGenerator;
        let tokens: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_uuid_token_format() {
        let token = UuidTokenGenerator.generate();
        assert!(Uuid::parse_str(&token).is_ok());
        assert_eq!(token.len(), 36);
    }
}
