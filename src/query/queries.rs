/// 상품 + 판매자 프로필 조회 (공통 SELECT)
macro_rules! product_with_seller {
    ($tail:literal) => {
        concat!(
            "SELECT p.id, p.title, p.description, p.image_url, p.category, p.starting_price, p.current_price, ",
            "p.end_time, p.seller_id, p.status, p.winner, p.created_at, ",
            "s.name AS seller_name, s.avatar_url AS seller_avatar_url, s.created_at AS seller_created_at ",
            "FROM products p LEFT JOIN profiles s ON s.id = p.seller_id ",
            $tail
        )
    };
}

/// 모든 상품 조회
pub const LIST_PRODUCTS: &str = product_with_seller!("ORDER BY p.created_at DESC");

/// 카테고리별 상품 조회
pub const LIST_PRODUCTS_BY_CATEGORY: &str =
    product_with_seller!("WHERE p.category = $1 ORDER BY p.created_at DESC");

/// 상품 조회
pub const GET_PRODUCT: &str = product_with_seller!("WHERE p.id = $1");

/// 상품 등록
pub const INSERT_PRODUCT: &str = r#"
    INSERT INTO products (id, title, description, image_url, category, starting_price, current_price, end_time, seller_id, status, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8, 'ongoing', $9)
    RETURNING id, title, description, image_url, category, starting_price, current_price,
              end_time, seller_id, status, winner, created_at,
              NULL::TEXT AS seller_name, NULL::TEXT AS seller_avatar_url, NULL::TIMESTAMPTZ AS seller_created_at
"#;

/// 상품 입찰 이력 조회
pub const LIST_BIDS: &str = r#"
    SELECT b.id, b.product_id, b.bidder_id, b.amount, b.created_at,
           p.name AS bidder_name, p.avatar_url AS bidder_avatar_url
    FROM bids b
    LEFT JOIN profiles p ON p.id = b.bidder_id
    WHERE b.product_id = $1
    ORDER BY b.created_at DESC
"#;

/// 조건부 현재가 갱신 (진행 중 + 최소 증가폭 충족 시에만)
pub const RAISE_CURRENT_PRICE: &str = r#"
    UPDATE products SET current_price = $1
    WHERE id = $2 AND status = 'ongoing' AND end_time > $3 AND current_price <= $1 - $4
    RETURNING current_price
"#;

/// 입찰 거절 사유 판별용 상태 조회
pub const GET_BID_STATE: &str =
    "SELECT current_price, status, end_time FROM products WHERE id = $1";

/// 입찰 기록
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (id, product_id, bidder_id, amount, created_at)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, product_id, bidder_id, amount, created_at
"#;

/// 프로필 조회
pub const GET_PROFILE: &str = "SELECT id, name, avatar_url, bio, location, phone, interests, created_at, updated_at FROM profiles WHERE id = $1";

/// 프로필 생성 (이미 있으면 아무 행도 반환하지 않음)
pub const INSERT_PROFILE: &str = r#"
    INSERT INTO profiles (id, name, avatar_url, bio, location, phone, interests, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (id) DO NOTHING
    RETURNING id, name, avatar_url, bio, location, phone, interests, created_at, updated_at
"#;

/// 프로필 편집 내용 upsert
pub const UPSERT_PROFILE_FIELDS: &str = r#"
    INSERT INTO profiles (id, name, bio, location, phone, interests, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
    ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name,
        bio = EXCLUDED.bio,
        location = EXCLUDED.location,
        phone = EXCLUDED.phone,
        interests = EXCLUDED.interests,
        updated_at = EXCLUDED.updated_at
    RETURNING id, name, avatar_url, bio, location, phone, interests, created_at, updated_at
"#;

/// 아바타 upsert
pub const UPSERT_PROFILE_AVATAR: &str = r#"
    INSERT INTO profiles (id, name, avatar_url, created_at, updated_at)
    VALUES ($1, '', $2, $3, $3)
    ON CONFLICT (id) DO UPDATE SET
        avatar_url = EXCLUDED.avatar_url,
        updated_at = EXCLUDED.updated_at
    RETURNING id, name, avatar_url, bio, location, phone, interests, created_at, updated_at
"#;

/// 계정 조회
pub const GET_USER_BY_EMAIL: &str =
    "SELECT id, email, name, password_hash, password_salt FROM users WHERE email = $1";

/// 계정 생성
pub const INSERT_USER: &str = r#"
    INSERT INTO users (id, email, name, password_hash, password_salt, created_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (email) DO NOTHING
    RETURNING id
"#;

/// 가입 시 프로필 생성 (이미 있으면 유지)
pub const INSERT_SIGNUP_PROFILE: &str = r#"
    INSERT INTO profiles (id, name, created_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (id) DO NOTHING
"#;
