use sea_orm_migration::prelude::*;
use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Banners (卡池配置)
#[derive(DeriveIden)]
enum Banners {
    Table,
    Id,
    Name,
    CurrencyType,
    CostPerPull,
    StartDate,
    EndDate,
    IsActive,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

/// Prizes (奖品配置)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    NameEn,
    Rarity,
    ValueCents,
    StockLimit,
    StockRemaining,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Prize Pool Entries (卡池奖品挂载)
#[derive(DeriveIden)]
enum PrizePoolEntries {
    Table,
    Id,
    BannerId,
    PrizeId,
    Rarity,
    Weight,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// User Pity (保底计数器, 按用户+卡池)
#[derive(DeriveIden)]
enum UserPity {
    Table,
    Id,
    UserId,
    BannerId,
    Counter,
    CreatedAt,
    UpdatedAt,
}

/// Pull Records (抽卡记录)
#[derive(DeriveIden)]
enum PullRecords {
    Table,
    Id,
    UserId,
    BannerId,
    PrizeId,
    PrizeNameEn,
    Rarity,
    Currency,
    CurrencySpent,
    SequenceIndex,
    CreatedAt,
}

/// 稀有度档位概率 (basis points, 100% = 10000):
/// - COMMON 60% -> 6000
/// - RARE 25% -> 2500
/// - EPIC 10% -> 1000
/// - SSR 4% -> 400
/// - LEGENDARY 1% -> 100
/// 档内按 weight 做二次加权抽取，limited 奖品用 stock_remaining 扣减。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 稀有度枚举类型（升序）
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("rarity"))
                    .values(vec![
                        Alias::new("common"),
                        Alias::new("rare"),
                        Alias::new("epic"),
                        Alias::new("ssr"),
                        Alias::new("legendary"),
                    ])
                    .to_owned(),
            )
            .await?;

        // 卡池表
        manager
            .create_table(
                Table::create()
                    .table(Banners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Banners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Banners::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Banners::CurrencyType)
                            .custom(Alias::new("currency_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Banners::CostPerPull)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Banners::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Banners::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Banners::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Banners::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Banners::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Banners::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 卡池名唯一（种子数据按名称幂等）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_banners_name_unique")
                    .table(Banners::Table)
                    .col(Banners::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 奖品表
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::NameEn).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Prizes::Rarity)
                            .custom(Alias::new("rarity"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prizes::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Prizes::StockLimit)
                            .big_integer()
                            .null(), // NULL = 无限库存
                    )
                    .col(
                        ColumnDef::new(Prizes::StockRemaining)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Prizes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_name_en_unique")
                    .table(Prizes::Table)
                    .col(Prizes::NameEn)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 卡池奖品挂载表
        manager
            .create_table(
                Table::create()
                    .table(PrizePoolEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrizePoolEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrizePoolEntries::BannerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizePoolEntries::PrizeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizePoolEntries::Rarity)
                            .custom(Alias::new("rarity"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrizePoolEntries::Weight).integer().not_null())
                    .col(
                        ColumnDef::new(PrizePoolEntries::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PrizePoolEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(PrizePoolEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一卡池内一个奖品只挂一条
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pool_entries_banner_prize_unique")
                    .table(PrizePoolEntries::Table)
                    .col(PrizePoolEntries::BannerId)
                    .col(PrizePoolEntries::PrizeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(PrizePoolEntries::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_pool_entry_banner")
                            .from_tbl(PrizePoolEntries::Table)
                            .from_col(PrizePoolEntries::BannerId)
                            .to_tbl(Banners::Table)
                            .to_col(Banners::Id),
                    )
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_pool_entry_prize")
                            .from_tbl(PrizePoolEntries::Table)
                            .from_col(PrizePoolEntries::PrizeId)
                            .to_tbl(Prizes::Table)
                            .to_col(Prizes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 保底计数表
        manager
            .create_table(
                Table::create()
                    .table(UserPity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPity::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserPity::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserPity::BannerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserPity::Counter)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserPity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(UserPity::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个用户在一个卡池下只有一行计数
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_pity_user_banner_unique")
                    .table(UserPity::Table)
                    .col(UserPity::UserId)
                    .col(UserPity::BannerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 抽卡记录表
        manager
            .create_table(
                Table::create()
                    .table(PullRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PullRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PullRecords::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PullRecords::BannerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PullRecords::PrizeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PullRecords::PrizeNameEn)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PullRecords::Rarity)
                            .custom(Alias::new("rarity"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PullRecords::Currency)
                            .custom(Alias::new("currency_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PullRecords::CurrencySpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PullRecords::SequenceIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PullRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 用户查记录（倒序分页）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pull_records_user")
                    .table(PullRecords::Table)
                    .col(PullRecords::UserId)
                    .col(PullRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pull_records_banner")
                    .table(PullRecords::Table)
                    .col(PullRecords::BannerId)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(PullRecords::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_pull_record_prize")
                            .from_tbl(PullRecords::Table)
                            .from_col(PullRecords::PrizeId)
                            .to_tbl(Prizes::Table)
                            .to_col(Prizes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 初始化种子数据：首期卡池 + 五档奖品
        // 限量仅 Signed Polaroid（限量5），其余无限库存
        let conn = manager.get_connection();
        let backend = manager.get_database_backend();

        let seed_banner = r#"
INSERT INTO banners (name, currency_type, cost_per_pull, start_date, end_date, is_active, sort_order)
VALUES ('Aura Zone Vol. 1', 'diamonds', 300, NOW(), NOW() + INTERVAL '30 days', TRUE, 1)
ON CONFLICT (name) DO NOTHING;
"#;
        conn.execute_raw(Statement::from_string(backend, seed_banner.to_string()))
            .await?;

        let seed_prizes = r#"
INSERT INTO prizes (name_en, rarity, value_cents, stock_limit, stock_remaining, is_active)
VALUES
 ('Aura Shard', 'common', 0, NULL, NULL, TRUE),
 ('Stamina Potion', 'common', 0, NULL, NULL, TRUE),
 ('Photo Card Pack', 'rare', 100, NULL, NULL, TRUE),
 ('Rare Outfit Voucher', 'rare', 250, NULL, NULL, TRUE),
 ('Epic Accessory Box', 'epic', 500, NULL, NULL, TRUE),
 ('SSR Character: Luna', 'ssr', 0, NULL, NULL, TRUE),
 ('SSR Character: Kai', 'ssr', 0, NULL, NULL, TRUE),
 ('Legendary Aura Frame', 'legendary', 0, NULL, NULL, TRUE),
 ('Signed Polaroid', 'legendary', 0, 5, 5, TRUE)
ON CONFLICT (name_en) DO NOTHING;
"#;
        conn.execute_raw(Statement::from_string(backend, seed_prizes.to_string()))
            .await?;

        // 档内权重: 同稀有度内归一化，不要求合计固定值
        let seed_entries = r#"
INSERT INTO prize_pool_entries (banner_id, prize_id, rarity, weight, is_active)
SELECT b.id, p.id, p.rarity, v.weight, TRUE
FROM (VALUES
 ('Aura Shard', 60),
 ('Stamina Potion', 40),
 ('Photo Card Pack', 50),
 ('Rare Outfit Voucher', 50),
 ('Epic Accessory Box', 100),
 ('SSR Character: Luna', 50),
 ('SSR Character: Kai', 50),
 ('Legendary Aura Frame', 80),
 ('Signed Polaroid', 20)
) AS v(name_en, weight)
JOIN prizes p ON p.name_en = v.name_en
CROSS JOIN banners b
WHERE b.name = 'Aura Zone Vol. 1'
ON CONFLICT (banner_id, prize_id) DO NOTHING;
"#;
        conn.execute_raw(Statement::from_string(backend, seed_entries.to_string()))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：记录/计数 -> 挂载 -> 奖品/卡池 -> 枚举
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PullRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(UserPity::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PrizePoolEntries::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Banners::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(Alias::new("rarity")).to_owned())
            .await?;

        Ok(())
    }
}
