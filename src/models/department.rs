use std::fmt;

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::pool_from_ctx;
use crate::models::person::staff::Staff;

/// A group of staff members
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct Department {
    /// The ID of the department
    pub id: i64,
    /// The name of the department
    pub name: String,
    /// What the department is responsible for
    pub description: String,
}

#[ComplexObject]
impl Department {
    /// The staff members in this department
    pub async fn staff(&self, ctx: &Context<'_>) -> Result<Vec<Staff>> {
        Staff::in_department(self.id, pool_from_ctx(ctx)).await
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Department {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No department with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, description FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, description FROM departments ORDER BY name, id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(new_department: NewDepartment, pool: &SqlitePool) -> Result<i64> {
        let id = sqlx::query("INSERT INTO departments (name, description) VALUES (?, ?)")
            .bind(&new_department.name)
            .bind(&new_department.description)
            .execute(pool)
            .await?
            .last_insert_rowid();
        info!(id, name = %new_department.name, "created department");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewDepartment, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE departments SET name = ?, description = ? WHERE id = ?")
            .bind(&update.name)
            .bind(&update.description)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes every staff member in the department along with it (and, through
    /// the supervisor chain, everyone those staff members supervise).
    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        let department = Self::with_id(id, pool).await?;

        let removed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM staff WHERE department_id = ?",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, name = %department, staff = removed, "deleted department");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewDepartment {
    pub name: String,
    #[graphql(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::tests::mock::{mock_department, mock_staff};

    #[tokio::test]
    async fn displays_as_its_name() {
        let pool = test_pool().await;
        let id = Department::create(mock_department(), &pool).await.unwrap();

        assert_eq!(
            Department::with_id(id, &pool).await.unwrap().to_string(),
            "Registration"
        );
    }

    #[tokio::test]
    async fn deleting_a_department_deletes_its_staff() {
        let pool = test_pool().await;
        let registration = Department::create(mock_department(), &pool).await.unwrap();
        let security = Department::create(
            NewDepartment {
                name: "Security".to_owned(),
                ..mock_department()
            },
            &pool,
        )
        .await
        .unwrap();

        let lead = Staff::create(mock_staff(registration, None), &pool)
            .await
            .unwrap();
        let guard = Staff::create(mock_staff(security, None), &pool).await.unwrap();

        Department::delete(registration, &pool).await.unwrap();

        assert!(Staff::with_id_opt(lead, &pool).await.unwrap().is_none());
        assert!(Staff::with_id_opt(guard, &pool).await.unwrap().is_some());
        assert_eq!(Department::all(&pool).await.unwrap().len(), 1);
    }
}
